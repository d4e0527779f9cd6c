use crate::error::{Error, Result};
use std::fmt;

/// Calendar month a set of tables was trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(u8);

impl Month {
    pub fn new(month: u8) -> Result<Self> {
        if (1..=12).contains(&month) {
            Ok(Self(month))
        } else {
            Err(Error::InvalidParameter {
                name: "month",
                value: month.to_string(),
                reason: "must be in 1..=12".into(),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Month {
    type Error = Error;

    fn try_from(month: u8) -> Result<Self> {
        Self::new(month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}
