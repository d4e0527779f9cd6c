//! Validity predicates
//!
//! A classifier applies only where its physical assumptions hold. Each
//! predicate yields a boolean grid (true = the classifier may be applied) and
//! a classifier's mask is the logical AND of its predicate list, together with
//! "surface type > 0" and "not space". Pixels where an input geometry value is
//! missing (NaN) fail the day/night gates and pass the exclusions.

use super::inputs::{Angle, Channel, Scene};
use crate::statistics::{window_statistic, WindowParams, WindowStatistic};
use nbclm_core::raster::Raster;
use nbclm_core::{Result, SurfaceType};
use ndarray::{Array2, Zip};

/// Solar zenith (degrees) separating day from night for most tests
pub const DAY_ZENITH_LIMIT: f64 = 85.0;
/// Solar zenith (degrees) separating day from night for the 3.75 µm emissivity pair
pub const EMISSIVITY_DAY_ZENITH_LIMIT: f64 = 80.0;
/// Elevation (m) above which non-Arctic pixels are excluded
pub const TERRAIN_ELEVATION_LIMIT: f64 = 2000.0;
/// Glint angle (degrees) below which sun glint is possible
pub const GLINT_ANGLE_LIMIT: f64 = 40.0;
/// Minimum 10.8 µm brightness temperature (K) of a glint pixel
pub const GLINT_BT_MIN: f64 = 273.15;
/// Maximum 3x3 std of the 10.8 µm brightness temperature of a glint pixel
pub const GLINT_BT_STD_MAX: f64 = 1.0;
/// Maximum 3x3 std of the 0.65 µm reflectance (%) of a glint pixel
pub const GLINT_REF_STD_MAX: f64 = 2.0;
/// Minimum 0.65 µm reflectance (%) of a glint pixel
pub const GLINT_REF_MIN: f64 = 5.0;
/// Scattering angle (degrees) below which forward scattering is suspected
pub const FORWARD_SCATTERING_LIMIT: f64 = 80.0;
/// Satellite zenith (degrees) below which the forward scattering test applies
pub const FORWARD_SCATTERING_SAT_ZENITH_LIMIT: f64 = 95.0;
/// Airmass above which pixels are excluded
pub const AIRMASS_LIMIT: f64 = 5.0;

/// One validity predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validity {
    /// The channel is observed
    Observed(Channel),
    /// Solar zenith <= limit
    Day(f64),
    /// Solar zenith > limit
    Night(f64),
    /// Exclude elevation above 2000 m unless the surface is Arctic
    Terrain,
    /// Exclude coastal pixels
    Coastal,
    /// Exclude sun glint pixels
    SunGlint,
    /// Exclude forward scattering geometry
    ForwardScattering,
    /// Exclude high airmass
    Airmass,
    /// Exclude snow-flagged pixels
    Snow,
}

impl Validity {
    /// Day gate at the common 85° limit
    pub const DAY: Validity = Validity::Day(DAY_ZENITH_LIMIT);
    /// Night gate at the common 85° limit
    pub const NIGHT: Validity = Validity::Night(DAY_ZENITH_LIMIT);

    /// Evaluate the predicate over the scene
    pub fn mask(&self, scene: &Scene) -> Result<Array2<bool>> {
        match *self {
            Validity::Observed(c) => Ok(scene.band(c)?.observed().clone()),
            Validity::Day(limit) => Ok(scene.angle(Angle::SunZenith)?.data().mapv(|z| z <= limit)),
            Validity::Night(limit) => Ok(scene.angle(Angle::SunZenith)?.data().mapv(|z| z > limit)),
            Validity::Terrain => Ok(terrain_mask(scene.elevation()?, scene.surface_type())),
            Validity::Coastal => Ok(scene.coastal()?.mapv(|c| !c)),
            Validity::SunGlint => Ok(glint_mask(scene)?.mapv(|g| !g)),
            Validity::ForwardScattering => {
                let scattering = scene.angle(Angle::ScatteringAngle)?;
                let sat_zenith = scene.angle(Angle::SatelliteZenith)?;
                Ok(Zip::from(scattering.data())
                    .and(sat_zenith.data())
                    .map_collect(|&scat, &sat| {
                        !(scat < FORWARD_SCATTERING_LIMIT && sat < FORWARD_SCATTERING_SAT_ZENITH_LIMIT)
                    }))
            }
            Validity::Airmass => Ok(scene.angle(Angle::Airmass)?.data().mapv(|a| !(a > AIRMASS_LIMIT))),
            Validity::Snow => Ok(scene.snow()?.mapv(|s| !s)),
        }
    }
}

/// Classification domain: surface type > 0 and not space
pub fn domain_mask(scene: &Scene) -> Array2<bool> {
    Zip::from(scene.surface_type().data())
        .and(scene.space())
        .map_collect(|&sft, &space| sft > 0 && !space)
}

/// AND of the classification domain and every predicate
pub fn combine(scene: &Scene, predicates: &[Validity]) -> Result<Array2<bool>> {
    let mut valid = domain_mask(scene);
    for predicate in predicates {
        let mask = predicate.mask(scene)?;
        Zip::from(&mut valid).and(&mask).for_each(|v, &m| *v &= m);
    }
    Ok(valid)
}

fn terrain_mask(elevation: &Raster<f64>, sft: &Raster<u8>) -> Array2<bool> {
    Zip::from(elevation.data())
        .and(sft.data())
        .map_collect(|&elev, &s| !(elev > TERRAIN_ELEVATION_LIMIT && s != SurfaceType::Arctic.code()))
}

/// Sun glint pixels: small glint angle over a warm, spatially uniform and
/// bright surface.
pub fn glint_mask(scene: &Scene) -> Result<Array2<bool>> {
    let glint = scene.angle(Angle::SunGlint)?;
    let bt = scene.band(Channel::Bt1080)?;
    let refl = scene.band(Channel::Ref065)?;
    let bt_std = window_statistic(bt, WindowParams::three_by_three(WindowStatistic::StdDev))?;
    let ref_std = window_statistic(refl, WindowParams::three_by_three(WindowStatistic::StdDev))?;

    Ok(Zip::from(glint.data())
        .and(bt.values().data())
        .and(bt_std.values().data())
        .and(refl.values().data())
        .and(ref_std.values().data())
        .map_collect(|&angle, &t, &t_std, &r, &r_std| {
            angle < GLINT_ANGLE_LIMIT
                && t >= GLINT_BT_MIN
                && t_std <= GLINT_BT_STD_MAX
                && r_std <= GLINT_REF_STD_MAX
                && r >= GLINT_REF_MIN
        }))
}
