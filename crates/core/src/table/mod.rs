//! Binned class-conditional likelihood tables
//!
//! A table holds, for each classified surface type, a 100-bin histogram of
//! the ratio P(feature | clear) / P(feature | cloudy) together with the prior
//! probability of cloud. Tables are trained offline, one per classifier and
//! month, and are read-only here.

mod io;
mod month;
mod store;

pub use io::{load_table, save_table};
pub use month::Month;
pub use store::{TableSource, TableStore};

use crate::error::{Error, Result};
use crate::surface::SurfaceType;
use serde::{Deserialize, Serialize};

/// Number of bins per surface type
pub const N_BINS: usize = 100;

/// Number of classified surface types (rows per table)
pub const N_SURFACES: usize = 7;

/// Allowed drift, in bins, between `bin_end` and `bin_start + N_BINS * delta_bin`
const BIN_SPAN_TOLERANCE: f64 = 1e-3;

/// One surface type's row of a likelihood table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBins {
    pub bin_start: f64,
    pub bin_end: f64,
    pub delta_bin: f64,
    /// Ratio per bin; index 0 holds bin 1
    pub class_cond_ratio: Vec<f64>,
    /// Prior probability of cloud for this surface type
    pub prior_yes: f64,
}

impl SurfaceBins {
    /// `N_BINS` bins of width `delta_bin` starting at `bin_start`, all with `ratio`
    pub fn uniform(bin_start: f64, delta_bin: f64, ratio: f64, prior_yes: f64) -> Self {
        Self {
            bin_start,
            bin_end: bin_start + delta_bin * N_BINS as f64,
            delta_bin,
            class_cond_ratio: vec![ratio; N_BINS],
            prior_yes,
        }
    }

    /// 1-based bin number of `x`, saturated to `1..=N_BINS`
    pub fn bin_index(&self, x: f64) -> usize {
        if x >= self.bin_end {
            return N_BINS;
        }
        let raw = ((x - self.bin_start) / self.delta_bin).floor();
        if raw.is_nan() {
            return 1;
        }
        // float to int casts saturate, so +/- inf land on the edges
        (raw as i64).saturating_add(1).clamp(1, N_BINS as i64) as usize
    }

    /// Ratio stored in 1-based `bin`; neutral for a row without that bin
    pub fn ratio(&self, bin: usize) -> f64 {
        self.class_cond_ratio
            .get(bin.clamp(1, N_BINS) - 1)
            .copied()
            .unwrap_or(1.0)
    }

    /// Ratio for feature value `x`
    pub fn lookup(&self, x: f64) -> f64 {
        self.ratio(self.bin_index(x))
    }

    fn validate(&self, table: &str, sft: usize) -> Result<()> {
        let invalid = |reason: String| Error::InvalidTable {
            table: table.to_string(),
            reason: format!("surface type {}: {}", sft, reason),
        };

        if self.class_cond_ratio.len() != N_BINS {
            return Err(invalid(format!(
                "expected {} bins, found {}",
                N_BINS,
                self.class_cond_ratio.len()
            )));
        }
        if !(self.delta_bin.is_finite() && self.delta_bin > 0.0) {
            return Err(invalid(format!("delta_bin must be positive, got {}", self.delta_bin)));
        }
        if !self.bin_start.is_finite() {
            return Err(invalid("bin_start is not finite".into()));
        }
        if !self.bin_end.is_finite() {
            return Err(invalid("bin_end is not finite".into()));
        }
        let span = (self.bin_end - self.bin_start) / self.delta_bin;
        if (span - N_BINS as f64).abs() > BIN_SPAN_TOLERANCE {
            return Err(invalid(format!(
                "bin_end {} does not close {} bins of {} from {}",
                self.bin_end, N_BINS, self.delta_bin, self.bin_start
            )));
        }
        if let Some((i, r)) = self
            .class_cond_ratio
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r >= 0.0))
        {
            return Err(invalid(format!("bin {} has ratio {}", i + 1, r)));
        }
        if !(self.prior_yes > 0.0 && self.prior_yes <= 1.0) {
            return Err(invalid(format!("prior_yes must be in (0, 1], got {}", self.prior_yes)));
        }
        Ok(())
    }
}

/// A pre-trained lookup table for one classifier and month.
///
/// Deserialization goes through [`BinnedLikelihoodTable::new`], so every
/// table in memory has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableFields")]
pub struct BinnedLikelihoodTable {
    name: String,
    rows: Vec<SurfaceBins>,
}

/// Unvalidated on-disk form of a table
#[derive(Deserialize)]
pub(crate) struct TableFields {
    name: String,
    rows: Vec<SurfaceBins>,
}

impl TryFrom<TableFields> for BinnedLikelihoodTable {
    type Error = Error;

    fn try_from(fields: TableFields) -> Result<Self> {
        Self::new(fields.name, fields.rows)
    }
}

impl BinnedLikelihoodTable {
    /// Build a table, checking row and bin counts, bin widths and priors.
    pub fn new(name: impl Into<String>, rows: Vec<SurfaceBins>) -> Result<Self> {
        let table = Self {
            name: name.into(),
            rows,
        };
        table.validate()?;
        Ok(table)
    }

    /// Same row for every surface type
    pub fn uniform(name: impl Into<String>, bins: SurfaceBins) -> Result<Self> {
        Self::new(name, vec![bins; N_SURFACES])
    }

    fn validate(&self) -> Result<()> {
        if self.rows.len() != N_SURFACES {
            return Err(Error::InvalidTable {
                table: self.name.clone(),
                reason: format!("expected {} surface rows, found {}", N_SURFACES, self.rows.len()),
            });
        }
        for (i, row) in self.rows.iter().enumerate() {
            row.validate(&self.name, i + 1)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[SurfaceBins] {
        &self.rows
    }

    /// Row for a surface type code, `None` for space and unknown codes
    pub fn row(&self, sft: u8) -> Option<&SurfaceBins> {
        SurfaceType::from_u8(sft)
            .and_then(SurfaceType::table_row)
            .and_then(|i| self.rows.get(i))
    }

    /// 1-based bin of `x` for surface type `sft`
    pub fn bin_index(&self, sft: u8, x: f64) -> Option<usize> {
        self.row(sft).map(|row| row.bin_index(x))
    }

    /// Class-conditional ratio of `x` for surface type `sft`
    pub fn ratio(&self, sft: u8, x: f64) -> Option<f64> {
        self.row(sft).map(|row| row.lookup(x))
    }

    pub fn prior_yes(&self, sft: u8) -> Option<f64> {
        self.row(sft).map(|row| row.prior_yes)
    }
}

/// Posterior probability of cloud from a likelihood ratio and prior.
///
/// `ratio` is P(x | clear) / P(x | cloudy).
#[inline]
pub fn posterior_probability(ratio: f64, prior_yes: f64) -> f64 {
    1.0 / (1.0 + ratio / prior_yes - ratio)
}
