//! Contingency counts and skill scores against a reference cloud mask
//!
//! Only the confident categories take part: cloudy (0) and clear (3).

use crate::fusion::CloudCategory;
use nbclm_core::raster::{GridShape, Raster};
use nbclm_core::Result;
use ndarray::{Array2, Zip};
use serde::Serialize;

/// Regularizer keeping every score finite on empty classes
pub const SCORE_EPSILON: f64 = 1e-5;

/// 2x2 contingency table of cloudy/clear decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Contingency {
    /// Reference cloudy, predicted cloudy
    pub a: u64,
    /// Reference clear, predicted cloudy
    pub b: u64,
    /// Reference cloudy, predicted clear
    pub c: u64,
    /// Reference clear, predicted clear
    pub d: u64,
}

impl Contingency {
    pub fn total(&self) -> u64 {
        self.a + self.b + self.c + self.d
    }
}

/// Count cloudy/clear agreement between two category grids.
///
/// `domain`, when given, restricts the count to pixels where it is true.
pub fn contingency(
    reference: &Raster<u8>,
    predicted: &Raster<u8>,
    domain: Option<&Array2<bool>>,
) -> Result<Contingency> {
    let shape = GridShape::from(reference.shape());
    predicted.ensure_shape("predicted", shape)?;
    if let Some(domain) = domain {
        shape.check("domain", domain.dim())?;
    }

    const CLOUDY: u8 = CloudCategory::Cloudy as u8;
    const CLEAR: u8 = CloudCategory::Clear as u8;

    let mut counts = Contingency::default();
    Zip::indexed(reference.data())
        .and(predicted.data())
        .for_each(|(row, col), &r, &p| {
            if domain.is_some_and(|d| !d[[row, col]]) {
                return;
            }
            match (r, p) {
                (CLOUDY, CLOUDY) => counts.a += 1,
                (CLEAR, CLOUDY) => counts.b += 1,
                (CLOUDY, CLEAR) => counts.c += 1,
                (CLEAR, CLEAR) => counts.d += 1,
                _ => {}
            }
        });
    Ok(counts)
}

/// Skill scores of a cloud mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillScores {
    /// Probability of detection of cloudy pixels
    pub pod_cloudy: f64,
    /// Probability of detection of clear pixels
    pub pod_clear: f64,
    /// False alarm ratio of cloudy predictions
    pub far_cloudy: f64,
    /// False alarm ratio of clear predictions
    pub far_clear: f64,
    pub hit_rate: f64,
    /// Hanssen-Kuipers skill score
    pub kss: f64,
}

impl SkillScores {
    pub fn from_contingency(t: &Contingency) -> Self {
        let (a, b, c, d) = (t.a as f64, t.b as f64, t.c as f64, t.d as f64);
        let eps = SCORE_EPSILON;
        Self {
            pod_cloudy: a / (a + b + eps),
            pod_clear: d / (c + d + eps),
            far_cloudy: c / (a + c + eps),
            far_clear: b / (b + d + eps),
            hit_rate: (a + d) / (a + b + c + d + eps),
            kss: (a * d - c * b) / ((a + b) * (c + d) + eps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts() {
        let reference = Raster::from_vec(vec![0u8, 0, 3, 3, 1, 126], 2, 3).unwrap();
        let predicted = Raster::from_vec(vec![0u8, 3, 0, 3, 0, 0], 2, 3).unwrap();
        let t = contingency(&reference, &predicted, None).unwrap();
        assert_eq!(t, Contingency { a: 1, b: 1, c: 1, d: 1 });

        let domain = Array2::from_shape_vec((2, 3), vec![true, false, false, true, true, true])
            .unwrap();
        let t = contingency(&reference, &predicted, Some(&domain)).unwrap();
        assert_eq!(t, Contingency { a: 1, b: 0, c: 0, d: 1 });
    }

    #[test]
    fn test_perfect_scores() {
        let t = Contingency { a: 60, b: 0, c: 0, d: 40 };
        let s = SkillScores::from_contingency(&t);
        assert_relative_eq!(s.pod_cloudy, 1.0, epsilon = 1e-6);
        assert_relative_eq!(s.pod_clear, 1.0, epsilon = 1e-6);
        assert_relative_eq!(s.far_cloudy, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.hit_rate, 1.0, epsilon = 1e-6);
        assert_relative_eq!(s.kss, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_table_is_finite() {
        let s = SkillScores::from_contingency(&Contingency::default());
        assert_eq!(s.pod_cloudy, 0.0);
        assert_eq!(s.kss, 0.0);
    }
}
