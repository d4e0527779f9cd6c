//! The classifier catalogue

use super::feature::Feature;
use super::inputs::Channel;
use super::validity::{Validity, EMISSIVITY_DAY_ZENITH_LIMIT};
use crate::statistics::WindowStatistic;
use nbclm_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known classifiers. Serialized by table id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierKind {
    #[serde(rename = "Ref_063_Min_3x3_Day")]
    Ref063Min3x3Day,
    #[serde(rename = "T_Std")]
    TStd,
    #[serde(rename = "Btd_11_85")]
    Bt1185,
    #[serde(rename = "Ref_Ratio_Day")]
    RefRatioDay,
    #[serde(rename = "Ref_138_Day")]
    Ref138Day,
    #[serde(rename = "Ndsi_Day")]
    NdsiDay,
    #[serde(rename = "Ref_063_Day")]
    Ref063Day,
    #[serde(rename = "T_11")]
    T11,
    #[serde(rename = "Tmax_T")]
    TmaxT,
    #[serde(rename = "Btd_375_11_Night")]
    Btd37511Night,
    #[serde(rename = "Ref_Std")]
    RefStd,
    #[serde(rename = "Emiss_375_Day")]
    Emiss375Day,
    #[serde(rename = "Emiss_375_Night")]
    Emiss375Night,
    #[serde(rename = "GeoColorRGB")]
    GeoColorRgb,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 14] = [
        ClassifierKind::Ref063Min3x3Day,
        ClassifierKind::TStd,
        ClassifierKind::Bt1185,
        ClassifierKind::RefRatioDay,
        ClassifierKind::Ref138Day,
        ClassifierKind::NdsiDay,
        ClassifierKind::Ref063Day,
        ClassifierKind::T11,
        ClassifierKind::TmaxT,
        ClassifierKind::Btd37511Night,
        ClassifierKind::RefStd,
        ClassifierKind::Emiss375Day,
        ClassifierKind::Emiss375Night,
        ClassifierKind::GeoColorRgb,
    ];

    /// Identifier of the trained table, also the file name stem
    pub fn table_id(self) -> &'static str {
        match self {
            ClassifierKind::Ref063Min3x3Day => "Ref_063_Min_3x3_Day",
            ClassifierKind::TStd => "T_Std",
            ClassifierKind::Bt1185 => "Btd_11_85",
            ClassifierKind::RefRatioDay => "Ref_Ratio_Day",
            ClassifierKind::Ref138Day => "Ref_138_Day",
            ClassifierKind::NdsiDay => "Ndsi_Day",
            ClassifierKind::Ref063Day => "Ref_063_Day",
            ClassifierKind::T11 => "T_11",
            ClassifierKind::TmaxT => "Tmax_T",
            ClassifierKind::Btd37511Night => "Btd_375_11_Night",
            ClassifierKind::RefStd => "Ref_Std",
            ClassifierKind::Emiss375Day => "Emiss_375_Day",
            ClassifierKind::Emiss375Night => "Emiss_375_Night",
            ClassifierKind::GeoColorRgb => "GeoColorRGB",
        }
    }

    pub fn feature(self) -> Feature {
        use Channel::*;
        match self {
            ClassifierKind::Ref063Min3x3Day => Feature::Window(Ref065, WindowStatistic::Min),
            ClassifierKind::TStd => Feature::Window(Bt1080, WindowStatistic::StdDev),
            ClassifierKind::Bt1185 => Feature::Difference(Bt1080, Bt850),
            ClassifierKind::RefRatioDay => Feature::Ratio(Ref083, Ref065),
            ClassifierKind::Ref138Day => Feature::Band(Ref137),
            ClassifierKind::NdsiDay => Feature::NormalizedDifference(Ref065, Ref161),
            ClassifierKind::Ref063Day => Feature::Difference(Ref065, Ref065Clear),
            ClassifierKind::T11 => Feature::Band(Bt1080),
            ClassifierKind::TmaxT => Feature::MaxMinusCenter(Bt1080),
            ClassifierKind::Btd37511Night => Feature::Difference(Bt372Low, Bt1080),
            ClassifierKind::RefStd => Feature::Window(Ref065, WindowStatistic::StdDev),
            ClassifierKind::Emiss375Day | ClassifierKind::Emiss375Night => Feature::Band(Ems372),
            ClassifierKind::GeoColorRgb => Feature::Luma(GeoColorRed, GeoColorGreen, GeoColorBlue),
        }
    }

    /// Predicates besides "surface type > 0" and "not space"
    pub fn validity(self) -> Vec<Validity> {
        use Channel::*;
        use Validity::*;
        match self {
            ClassifierKind::Ref063Min3x3Day => vec![Observed(Ref065), Validity::DAY, Terrain, Coastal],
            ClassifierKind::TStd => vec![Observed(Bt1080), Terrain, Coastal],
            ClassifierKind::Bt1185 => vec![Observed(Bt1080), Observed(Bt850)],
            ClassifierKind::RefRatioDay => vec![
                Observed(Ref083),
                Observed(Ref065),
                Terrain,
                Validity::DAY,
                SunGlint,
            ],
            ClassifierKind::Ref138Day => vec![
                Observed(Ref137),
                Terrain,
                Validity::DAY,
                ForwardScattering,
                Airmass,
            ],
            ClassifierKind::NdsiDay => vec![
                Observed(Ref065),
                Observed(Ref161),
                SunGlint,
                Validity::DAY,
                ForwardScattering,
                Airmass,
            ],
            ClassifierKind::Ref063Day => vec![
                Observed(Ref065),
                Observed(Ref065Clear),
                Terrain,
                SunGlint,
                Validity::DAY,
                ForwardScattering,
                Airmass,
                Snow,
            ],
            ClassifierKind::T11 => vec![Observed(Bt1080)],
            ClassifierKind::TmaxT => vec![Observed(Bt1080), Terrain, Coastal],
            ClassifierKind::Btd37511Night => {
                vec![Observed(Bt372Low), Observed(Bt1080), Validity::NIGHT]
            }
            ClassifierKind::RefStd => vec![Observed(Ref065), Validity::DAY, Terrain, Coastal],
            ClassifierKind::Emiss375Day => {
                vec![Observed(Ems372), Day(EMISSIVITY_DAY_ZENITH_LIMIT)]
            }
            ClassifierKind::Emiss375Night => {
                vec![Observed(Ems372), Night(EMISSIVITY_DAY_ZENITH_LIMIT)]
            }
            ClassifierKind::GeoColorRgb => vec![
                Observed(GeoColorRed),
                Observed(GeoColorGreen),
                Observed(GeoColorBlue),
            ],
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_id())
    }
}

impl FromStr for ClassifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        ClassifierKind::ALL
            .iter()
            .copied()
            .find(|k| k.table_id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidParameter {
                name: "classifier",
                value: s.to_string(),
                reason: "unknown classifier".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_unique() {
        let mut ids: Vec<_> = ClassifierKind::ALL.iter().map(|k| k.table_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ClassifierKind::ALL.len());
    }

    #[test]
    fn test_parse_and_serde_agree() {
        for kind in ClassifierKind::ALL {
            assert_eq!(kind.table_id().parse::<ClassifierKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.table_id()));
        }
        assert!("T_12".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_every_feature_band_is_checked_for_observation() {
        for kind in ClassifierKind::ALL {
            let validity = kind.validity();
            for channel in kind.feature().channels() {
                assert!(
                    validity.contains(&Validity::Observed(channel)),
                    "{} does not check {}",
                    kind,
                    channel
                );
            }
        }
    }
}
