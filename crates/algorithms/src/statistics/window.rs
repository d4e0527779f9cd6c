//! Masked moving-window statistics
//!
//! Computes a statistic over the square window centered on each pixel,
//! using only neighbours that are inside the grid and observed. Several
//! classifier features (3x3 min, max and standard deviation) and the sun
//! glint test are built on this.

use crate::maybe_rayon::*;
use ndarray::Array2;
use nbclm_core::raster::{MaskedRaster, Neighborhood, Raster};
use nbclm_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Available window statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatistic {
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Standard deviation (population)
    StdDev,
}

/// Parameters for window statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowParams {
    /// Window radius (window size = 2*radius + 1)
    pub radius: usize,
    /// Statistic to compute
    pub statistic: WindowStatistic,
}

impl WindowParams {
    /// 3x3 window
    pub fn three_by_three(statistic: WindowStatistic) -> Self {
        Self {
            radius: 1,
            statistic,
        }
    }
}

/// Compute a window statistic on a masked raster
///
/// A pixel of the output is observed when at least one pixel of its window
/// is observed. Out-of-grid positions are skipped rather than padded, so
/// edge pixels use a truncated window.
pub fn window_statistic(band: &MaskedRaster, params: WindowParams) -> Result<MaskedRaster> {
    if params.radius == 0 {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: "0".into(),
            reason: "window radius must be > 0".into(),
        });
    }

    let (rows, cols) = band.shape();
    let offsets = Neighborhood::square(params.radius).offsets();
    let values = band.values().data();
    let observed = band.observed();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            let mut window: Vec<f64> = Vec::with_capacity(offsets.len());

            for (col, out) in row_data.iter_mut().enumerate() {
                window.clear();
                for (nr, nc) in Neighborhood::cells_within(&offsets, row, col, rows, cols) {
                    if observed[[nr, nc]] {
                        window.push(values[[nr, nc]]);
                    }
                }

                if window.is_empty() {
                    continue;
                }

                *out = compute_statistic(&window, params.statistic);
            }

            row_data
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(MaskedRaster::from_raster(Raster::from_array(data)))
}

fn compute_statistic(values: &[f64], stat: WindowStatistic) -> f64 {
    let n = values.len() as f64;

    match stat {
        WindowStatistic::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        WindowStatistic::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        WindowStatistic::StdDev => {
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            var.sqrt()
        }
    }
}
