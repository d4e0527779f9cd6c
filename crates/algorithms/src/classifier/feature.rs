//! Feature recipes
//!
//! Each classifier looks its table up with one scalar feature per pixel,
//! derived from the scene bands. The recipes cover band values, band
//! differences and ratios, a normalized difference, 3x3 window statistics and
//! the luma of the GeoColor composite.

use super::inputs::{Channel, Scene};
use crate::statistics::{window_statistic, WindowParams, WindowStatistic};
use nbclm_core::raster::MaskedRaster;
use nbclm_core::Result;

/// Luma weights of the red, green and blue GeoColor components
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// How a classifier feature is derived from the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The band as observed
    Band(Channel),
    /// `a - b`
    Difference(Channel, Channel),
    /// `a / b`, unobserved where `b` is zero
    Ratio(Channel, Channel),
    /// `(a - b) / (a + b)`, unobserved where `a + b` is zero
    NormalizedDifference(Channel, Channel),
    /// 3x3 window statistic of the band
    Window(Channel, WindowStatistic),
    /// 3x3 window maximum minus the center value
    MaxMinusCenter(Channel),
    /// `0.299 R + 0.587 G + 0.114 B`
    Luma(Channel, Channel, Channel),
}

impl Feature {
    /// Channels this feature reads
    pub fn channels(&self) -> Vec<Channel> {
        match *self {
            Feature::Band(c) | Feature::Window(c, _) | Feature::MaxMinusCenter(c) => vec![c],
            Feature::Difference(a, b)
            | Feature::Ratio(a, b)
            | Feature::NormalizedDifference(a, b) => vec![a, b],
            Feature::Luma(r, g, b) => vec![r, g, b],
        }
    }

    /// Compute the feature grid.
    ///
    /// Unobserved inputs propagate; a non-finite result is unobserved.
    pub fn compute(&self, scene: &Scene) -> Result<MaskedRaster> {
        match *self {
            Feature::Band(c) => Ok(scene.band(c)?.clone()),
            Feature::Difference(a, b) => scene.band(a)?.zip_with(scene.band(b)?, |x, y| Some(x - y)),
            Feature::Ratio(a, b) => scene
                .band(a)?
                .zip_with(scene.band(b)?, |x, y| if y == 0.0 { None } else { Some(x / y) }),
            Feature::NormalizedDifference(a, b) => {
                scene.band(a)?.zip_with(scene.band(b)?, |x, y| {
                    let sum = x + y;
                    if sum.abs() < 1e-10 {
                        None
                    } else {
                        Some((x - y) / sum)
                    }
                })
            }
            Feature::Window(c, statistic) => {
                window_statistic(scene.band(c)?, WindowParams::three_by_three(statistic))
            }
            Feature::MaxMinusCenter(c) => {
                let band = scene.band(c)?;
                let max = window_statistic(band, WindowParams::three_by_three(WindowStatistic::Max))?;
                max.zip_with(band, |m, v| Some(m - v))
            }
            Feature::Luma(r, g, b) => {
                let [wr, wg, wb] = LUMA_WEIGHTS;
                let rg = scene
                    .band(r)?
                    .zip_with(scene.band(g)?, |x, y| Some(wr * x + wg * y))?;
                rg.zip_with(scene.band(b)?, |x, y| Some(x + wb * y))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nbclm_core::Raster;

    fn scene() -> Scene {
        let band = |v: Vec<f64>| MaskedRaster::from_raster(Raster::from_vec(v, 2, 2).unwrap());
        Scene::new(Raster::filled(2, 2, 3u8))
            .with_band(Channel::Bt1080, band(vec![280.0, 285.0, f64::NAN, 290.0]))
            .unwrap()
            .with_band(Channel::Bt850, band(vec![278.0, 280.0, 281.0, 289.0]))
            .unwrap()
            .with_band(Channel::Ref065, band(vec![20.0, 0.0, 40.0, 10.0]))
            .unwrap()
            .with_band(Channel::Ref161, band(vec![10.0, 0.0, 20.0, 30.0]))
            .unwrap()
    }

    #[test]
    fn test_difference_propagates_mask() {
        let d = Feature::Difference(Channel::Bt1080, Channel::Bt850)
            .compute(&scene())
            .unwrap();
        assert_eq!(d.get(0, 0), Some(2.0));
        assert_eq!(d.get(1, 0), None);
        assert_eq!(d.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_normalized_difference_zero_sum() {
        let ndsi = Feature::NormalizedDifference(Channel::Ref065, Channel::Ref161)
            .compute(&scene())
            .unwrap();
        assert_relative_eq!(ndsi.get(0, 0).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(ndsi.get(0, 1), None);
        assert_relative_eq!(ndsi.get(1, 1).unwrap(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let r = Feature::Ratio(Channel::Ref161, Channel::Ref065)
            .compute(&scene())
            .unwrap();
        assert_eq!(r.get(0, 0), Some(0.5));
        assert_eq!(r.get(0, 1), None);
    }

    #[test]
    fn test_max_minus_center() {
        let f = Feature::MaxMinusCenter(Channel::Bt1080)
            .compute(&scene())
            .unwrap();
        assert_eq!(f.get(0, 0), Some(10.0));
        assert_eq!(f.get(1, 1), Some(0.0));
        assert_eq!(f.get(1, 0), None);
    }

    #[test]
    fn test_luma() {
        let s = Scene::new(Raster::filled(1, 1, 1u8))
            .with_band(Channel::GeoColorRed, MaskedRaster::filled(1, 1, 100.0))
            .unwrap()
            .with_band(Channel::GeoColorGreen, MaskedRaster::filled(1, 1, 200.0))
            .unwrap()
            .with_band(Channel::GeoColorBlue, MaskedRaster::filled(1, 1, 50.0))
            .unwrap();
        let f = Feature::Luma(Channel::GeoColorRed, Channel::GeoColorGreen, Channel::GeoColorBlue)
            .compute(&s)
            .unwrap();
        assert_relative_eq!(f.get(0, 0).unwrap(), 29.9 + 117.4 + 5.7, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_band() {
        let err = Feature::Band(Channel::Ems372).compute(&scene()).unwrap_err();
        assert!(matches!(err, nbclm_core::Error::MissingInput(_)));
    }
}
