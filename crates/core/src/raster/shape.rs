//! Scene grid shape

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (rows, cols) shape every grid of a scene must share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare an actual `(rows, cols)` against this shape.
    ///
    /// `name` identifies the offending grid in the error.
    pub fn check(&self, name: &str, actual: (usize, usize)) -> Result<()> {
        if (self.rows, self.cols) == actual {
            return Ok(());
        }
        Err(Error::ShapeMismatch {
            name: name.to_string(),
            er: self.rows,
            ec: self.cols,
            ar: actual.0,
            ac: actual.1,
        })
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
