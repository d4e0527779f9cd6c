//! Cloud mask categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a pixel is cloudy
pub const CLOUDY_THRESHOLD: f64 = 0.9;
/// Probability at or above which a pixel is probably cloudy
pub const PROBABLY_CLOUDY_THRESHOLD: f64 = 0.5;
/// Probability at or below which a pixel is clear
pub const CLEAR_THRESHOLD: f64 = 0.1;

/// Final per-pixel class of the cloud mask product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CloudCategory {
    Cloudy = 0,
    ProbablyCloudy = 1,
    ProbablyClear = 2,
    Clear = 3,
    /// Probability could not be computed
    Invalid = 4,
    /// Outside the classification domain
    Space = 126,
}

impl CloudCategory {
    pub const ALL: [CloudCategory; 6] = [
        CloudCategory::Cloudy,
        CloudCategory::ProbablyCloudy,
        CloudCategory::ProbablyClear,
        CloudCategory::Clear,
        CloudCategory::Invalid,
        CloudCategory::Space,
    ];

    /// Category of a posterior cloud probability.
    ///
    /// The partition is total: every finite value maps to exactly one of the
    /// four sky categories, anything else is `Invalid`.
    pub fn from_probability(p: f64) -> Self {
        if !p.is_finite() {
            CloudCategory::Invalid
        } else if p >= CLOUDY_THRESHOLD {
            CloudCategory::Cloudy
        } else if p >= PROBABLY_CLOUDY_THRESHOLD {
            CloudCategory::ProbablyCloudy
        } else if p > CLEAR_THRESHOLD {
            CloudCategory::ProbablyClear
        } else {
            CloudCategory::Clear
        }
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(CloudCategory::Cloudy),
            1 => Some(CloudCategory::ProbablyCloudy),
            2 => Some(CloudCategory::ProbablyClear),
            3 => Some(CloudCategory::Clear),
            4 => Some(CloudCategory::Invalid),
            126 => Some(CloudCategory::Space),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// One of the four sky categories (0..=3)
    pub fn is_sky(self) -> bool {
        self.code() <= CloudCategory::Clear.code()
    }

    pub fn name(self) -> &'static str {
        match self {
            CloudCategory::Cloudy => "cloudy",
            CloudCategory::ProbablyCloudy => "probably cloudy",
            CloudCategory::ProbablyClear => "probably clear",
            CloudCategory::Clear => "clear",
            CloudCategory::Invalid => "invalid",
            CloudCategory::Space => "space",
        }
    }
}

impl fmt::Display for CloudCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_edges() {
        assert_eq!(CloudCategory::from_probability(1.0), CloudCategory::Cloudy);
        assert_eq!(CloudCategory::from_probability(0.9), CloudCategory::Cloudy);
        assert_eq!(CloudCategory::from_probability(0.89), CloudCategory::ProbablyCloudy);
        assert_eq!(CloudCategory::from_probability(0.5), CloudCategory::ProbablyCloudy);
        assert_eq!(CloudCategory::from_probability(0.49), CloudCategory::ProbablyClear);
        assert_eq!(CloudCategory::from_probability(0.1), CloudCategory::Clear);
        assert_eq!(CloudCategory::from_probability(0.0), CloudCategory::Clear);
        assert_eq!(CloudCategory::from_probability(f64::NAN), CloudCategory::Invalid);
        assert_eq!(CloudCategory::from_probability(f64::INFINITY), CloudCategory::Invalid);
    }

    #[test]
    fn test_partition_is_total() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            assert!(CloudCategory::from_probability(p).is_sky());
        }
    }

    #[test]
    fn test_codes() {
        for c in CloudCategory::ALL {
            assert_eq!(CloudCategory::from_u8(c.code()), Some(c));
        }
        assert_eq!(CloudCategory::Space.code(), 126);
        assert!(CloudCategory::from_u8(5).is_none());
    }
}
