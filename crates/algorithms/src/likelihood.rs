//! Binned likelihood lookup
//!
//! The one lookup kernel shared by every classifier: bin the feature by the
//! pixel's surface type, read the class-conditional ratio and, on request,
//! turn it into a posterior probability of cloud.

use crate::maybe_rayon::*;
use nbclm_core::raster::{GridShape, MaskedRaster, Raster};
use nbclm_core::table::posterior_probability;
use nbclm_core::{BinnedLikelihoodTable, Error, Result};
use ndarray::{Array2, Zip};

/// Ratio assigned to pixels the classifier does not apply to
pub const NEUTRAL_RATIO: f64 = 1.0;
/// Probability assigned to pixels the classifier does not apply to
pub const INVALID_PROBABILITY: f64 = 0.0;

/// Output of one classifier
#[derive(Debug, Clone)]
pub struct Inference {
    /// Class-conditional ratio, 1.0 where the classifier does not apply
    pub ratio: Raster<f64>,
    /// Posterior probability of cloud, 0.0 where the classifier does not apply
    pub probability: Option<Raster<f64>>,
    /// Pixels where the table was looked up
    pub valid_count: usize,
}

/// Look `feature` up in `table`.
///
/// A pixel is looked up only if `valid` is true, the feature is observed,
/// its surface type is in 1..=7 and it is not space.
pub fn lookup(
    table: &BinnedLikelihoodTable,
    feature: &MaskedRaster,
    sft: &Raster<u8>,
    valid: &Array2<bool>,
    space: &Array2<bool>,
    want_probability: bool,
) -> Result<Inference> {
    let shape = GridShape::from(sft.shape());
    feature.ensure_shape("feature", shape)?;
    shape.check("validity mask", valid.dim())?;
    shape.check("space mask", space.dim())?;

    let (rows, cols) = sft.shape();
    let applies = Zip::from(valid)
        .and(feature.observed())
        .and(space)
        .map_collect(|&v, &obs, &sp| v && obs && !sp);
    let values = feature.values().data();
    let codes = sft.data();

    let pixels: Vec<(f64, f64)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![(NEUTRAL_RATIO, INVALID_PROBABILITY); cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                if !applies[[row, col]] {
                    continue;
                }
                let Some(bins) = table.row(codes[[row, col]]) else {
                    continue;
                };
                let ratio = bins.lookup(values[[row, col]]);
                let prob = if want_probability {
                    posterior_probability(ratio, bins.prior_yes)
                } else {
                    INVALID_PROBABILITY
                };
                *out = (ratio, prob);
            }
            row_data
        })
        .collect();

    let valid_count = Zip::from(&applies)
        .and(codes)
        .fold(0usize, |n, &a, &s| n + usize::from(a && table.row(s).is_some()));

    let (ratio, prob): (Vec<f64>, Vec<f64>) = pixels.into_iter().unzip();
    let ratio = Array2::from_shape_vec((rows, cols), ratio).map_err(|e| Error::Other(e.to_string()))?;
    let probability = if want_probability {
        let prob =
            Array2::from_shape_vec((rows, cols), prob).map_err(|e| Error::Other(e.to_string()))?;
        Some(Raster::from_array(prob))
    } else {
        None
    };

    Ok(Inference {
        ratio: Raster::from_array(ratio),
        probability,
        valid_count,
    })
}
