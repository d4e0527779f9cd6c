//! Validity chains of the classifier catalogue
//!
//! Every classifier is run on a 3x3 scene where all of its predicates hold,
//! then each exclusion is switched on at the center pixel alone.

use nbclm_algorithms::classifier::validity::{
    AIRMASS_LIMIT, DAY_ZENITH_LIMIT, EMISSIVITY_DAY_ZENITH_LIMIT, TERRAIN_ELEVATION_LIMIT,
};
use nbclm_algorithms::prelude::*;
use ndarray::Array2;
use std::collections::HashMap;
use std::sync::Arc;

const N: usize = 3;
const CENTER: (usize, usize) = (1, 1);
const TABLE_RATIO: f64 = 0.5;

/// Raw scene grids, editable before the scene is assembled
#[derive(Clone)]
struct Inputs {
    bands: HashMap<Channel, Array2<f64>>,
    angles: HashMap<Angle, Array2<f64>>,
    elevation: Array2<f64>,
    coastal: Array2<bool>,
    snow: Array2<bool>,
}

impl Inputs {
    /// Land scene on which every exclusion is off
    fn clear_land(sun_zenith: f64) -> Self {
        let grid = |v: f64| Array2::from_elem((N, N), v);
        let bands = Channel::ALL
            .iter()
            .map(|&c| {
                let v = match c {
                    Channel::Ems372 => 0.9,
                    Channel::Ref065Clear => 10.0,
                    Channel::GeoColorRed | Channel::GeoColorGreen | Channel::GeoColorBlue => 100.0,
                    Channel::Ref047
                    | Channel::Ref065
                    | Channel::Ref083
                    | Channel::Ref137
                    | Channel::Ref161
                    | Channel::Ref222 => 12.0,
                    _ => 290.0,
                };
                (c, grid(v))
            })
            .collect();
        let mut angles = HashMap::new();
        angles.insert(Angle::SunZenith, grid(sun_zenith));
        angles.insert(Angle::SatelliteZenith, grid(40.0));
        angles.insert(Angle::SunGlint, grid(90.0));
        angles.insert(Angle::ScatteringAngle, grid(120.0));
        angles.insert(Angle::Airmass, grid(1.5));

        Self {
            bands,
            angles,
            elevation: grid(100.0),
            coastal: Array2::from_elem((N, N), false),
            snow: Array2::from_elem((N, N), false),
        }
    }

    fn scene(&self) -> Scene {
        let sft = Raster::filled(N, N, SurfaceType::UnfrozenLand.code());
        let mut scene = Scene::new(sft)
            .with_elevation(Raster::from_array(self.elevation.clone()))
            .unwrap()
            .with_coastal(self.coastal.clone())
            .unwrap()
            .with_snow(self.snow.clone())
            .unwrap();
        for (&c, values) in &self.bands {
            let band = MaskedRaster::from_raster(Raster::from_array(values.clone()));
            scene = scene.with_band(c, band).unwrap();
        }
        for (&a, values) in &self.angles {
            scene = scene.with_angle(a, Raster::from_array(values.clone())).unwrap();
        }
        scene
    }

    fn set_angle(&mut self, angle: Angle, value: f64) {
        self.angles.get_mut(&angle).unwrap()[CENTER] = value;
    }
}

/// One exclusion switched on at the center pixel
#[derive(Debug, Clone, Copy, PartialEq)]
enum Exclusion {
    /// Flip day to night (or night to day)
    Illumination,
    Terrain,
    Coastal,
    SunGlint,
    ForwardScattering,
    Airmass,
    Snow,
}

const EXCLUSIONS: [Exclusion; 7] = [
    Exclusion::Illumination,
    Exclusion::Terrain,
    Exclusion::Coastal,
    Exclusion::SunGlint,
    Exclusion::ForwardScattering,
    Exclusion::Airmass,
    Exclusion::Snow,
];

impl Exclusion {
    fn apply(self, inputs: &mut Inputs, night: bool) {
        match self {
            Exclusion::Illumination => {
                inputs.set_angle(Angle::SunZenith, if night { 30.0 } else { 100.0 })
            }
            Exclusion::Terrain => inputs.elevation[CENTER] = TERRAIN_ELEVATION_LIMIT + 500.0,
            Exclusion::Coastal => inputs.coastal[CENTER] = true,
            // Warm, uniform and bright already; only the geometry is missing
            Exclusion::SunGlint => inputs.set_angle(Angle::SunGlint, 20.0),
            Exclusion::ForwardScattering => inputs.set_angle(Angle::ScatteringAngle, 70.0),
            Exclusion::Airmass => inputs.set_angle(Angle::Airmass, AIRMASS_LIMIT + 1.0),
            Exclusion::Snow => inputs.snow[CENTER] = true,
        }
    }

    fn listed_in(self, predicates: &[Validity]) -> bool {
        predicates.iter().any(|p| match (self, p) {
            (Exclusion::Illumination, Validity::Day(_) | Validity::Night(_)) => true,
            (Exclusion::Terrain, Validity::Terrain) => true,
            (Exclusion::Coastal, Validity::Coastal) => true,
            (Exclusion::SunGlint, Validity::SunGlint) => true,
            (Exclusion::ForwardScattering, Validity::ForwardScattering) => true,
            (Exclusion::Airmass, Validity::Airmass) => true,
            (Exclusion::Snow, Validity::Snow) => true,
            _ => false,
        })
    }
}

fn classifier(kind: ClassifierKind) -> Classifier {
    let bins = SurfaceBins::uniform(-1000.0, 20.0, TABLE_RATIO, 0.4);
    let table = BinnedLikelihoodTable::uniform(kind.table_id(), bins).unwrap();
    Classifier::new(kind, Arc::new(table)).unwrap()
}

fn is_night_test(kind: ClassifierKind) -> bool {
    kind.validity().iter().any(|p| matches!(p, Validity::Night(_)))
}

fn baseline(kind: ClassifierKind) -> Inputs {
    Inputs::clear_land(if is_night_test(kind) { 100.0 } else { 30.0 })
}

fn center_ratio(kind: ClassifierKind, inputs: &Inputs) -> (f64, usize) {
    let out = classifier(kind).run(&inputs.scene(), false).unwrap();
    (out.ratio.get(CENTER.0, CENTER.1).unwrap(), out.valid_count)
}

#[test]
fn every_classifier_applies_on_clear_land() {
    for kind in ClassifierKind::ALL {
        let (ratio, count) = center_ratio(kind, &baseline(kind));
        assert_eq!(ratio, TABLE_RATIO, "{}", kind);
        assert_eq!(count, N * N, "{}", kind);
    }
}

#[test]
fn listed_exclusions_drop_the_pixel() {
    for kind in ClassifierKind::ALL {
        let predicates = kind.validity();
        for exclusion in EXCLUSIONS {
            let mut inputs = baseline(kind);
            exclusion.apply(&mut inputs, is_night_test(kind));
            let (ratio, count) = center_ratio(kind, &inputs);

            if exclusion.listed_in(&predicates) {
                assert_eq!(ratio, 1.0, "{} under {:?}", kind, exclusion);
                assert_eq!(count, N * N - 1, "{} under {:?}", kind, exclusion);
            } else {
                assert_eq!(ratio, TABLE_RATIO, "{} under {:?}", kind, exclusion);
                assert_eq!(count, N * N, "{} under {:?}", kind, exclusion);
            }
        }
    }
}

#[test]
fn unobserved_inputs_drop_the_pixel() {
    for kind in ClassifierKind::ALL {
        for channel in kind.feature().channels() {
            let mut inputs = baseline(kind);
            inputs.bands.get_mut(&channel).unwrap()[CENTER] = f64::NAN;
            let (ratio, count) = center_ratio(kind, &inputs);
            assert_eq!(ratio, 1.0, "{} without {}", kind, channel);
            assert_eq!(count, N * N - 1, "{} without {}", kind, channel);
        }

        // A channel no classifier reads
        let mut inputs = baseline(kind);
        inputs.bands.get_mut(&Channel::Bt1350).unwrap()[CENTER] = f64::NAN;
        assert_eq!(center_ratio(kind, &inputs).0, TABLE_RATIO, "{}", kind);
    }
}

#[test]
fn observation_predicates_match_feature_channels() {
    for kind in ClassifierKind::ALL {
        let mut observed: Vec<Channel> = kind
            .validity()
            .iter()
            .filter_map(|p| match p {
                Validity::Observed(c) => Some(*c),
                _ => None,
            })
            .collect();
        let mut channels = kind.feature().channels();
        observed.sort();
        channels.sort();
        assert_eq!(observed, channels, "{}", kind);
    }
}

#[test]
fn day_gate_limits() {
    let cases = [
        (ClassifierKind::Ref063Day, DAY_ZENITH_LIMIT),
        (ClassifierKind::RefStd, DAY_ZENITH_LIMIT),
        (ClassifierKind::Emiss375Day, EMISSIVITY_DAY_ZENITH_LIMIT),
    ];
    for (kind, limit) in cases {
        let mut inputs = Inputs::clear_land(30.0);
        inputs.set_angle(Angle::SunZenith, limit);
        assert_eq!(center_ratio(kind, &inputs).0, TABLE_RATIO, "{} at {}", kind, limit);
        inputs.set_angle(Angle::SunZenith, limit + 0.1);
        assert_eq!(center_ratio(kind, &inputs).0, 1.0, "{} above {}", kind, limit);
    }

    for (kind, limit) in [
        (ClassifierKind::Btd37511Night, DAY_ZENITH_LIMIT),
        (ClassifierKind::Emiss375Night, EMISSIVITY_DAY_ZENITH_LIMIT),
    ] {
        let mut inputs = Inputs::clear_land(100.0);
        inputs.set_angle(Angle::SunZenith, limit);
        assert_eq!(center_ratio(kind, &inputs).0, 1.0, "{} at {}", kind, limit);
        inputs.set_angle(Angle::SunZenith, limit + 0.1);
        assert_eq!(center_ratio(kind, &inputs).0, TABLE_RATIO, "{} above {}", kind, limit);
    }
}

#[test]
fn terrain_exclusion_spares_arctic() {
    let kind = ClassifierKind::RefRatioDay;
    let mut inputs = baseline(kind);
    inputs.elevation[CENTER] = TERRAIN_ELEVATION_LIMIT + 500.0;

    let mut sft = Raster::filled(N, N, SurfaceType::UnfrozenLand.code());
    sft.set(CENTER.0, CENTER.1, SurfaceType::Arctic.code()).unwrap();
    let mut scene = Scene::new(sft)
        .with_elevation(Raster::from_array(inputs.elevation.clone()))
        .unwrap();
    for (&c, values) in &inputs.bands {
        let band = MaskedRaster::from_raster(Raster::from_array(values.clone()));
        scene = scene.with_band(c, band).unwrap();
    }
    for (&a, values) in &inputs.angles {
        scene = scene.with_angle(a, Raster::from_array(values.clone())).unwrap();
    }

    let out = classifier(kind).run(&scene, false).unwrap();
    assert_eq!(out.ratio.get(CENTER.0, CENTER.1).unwrap(), TABLE_RATIO);
    assert_eq!(out.valid_count, N * N);
}
