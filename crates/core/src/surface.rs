//! Surface type classes
//!
//! One shared home for the surface enumerations: the navigation land, snow
//! and desert classes, and the eight-way surface type that indexes every
//! likelihood table.

use crate::error::{Error, Result};
use crate::raster::{GridShape, Raster};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-pixel surface type.
///
/// `Space` pixels are outside the classification domain. The other seven
/// values select a row of a [`BinnedLikelihoodTable`](crate::BinnedLikelihoodTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum SurfaceType {
    Space = 0,
    DeepOcean = 1,
    ShallowOcean = 2,
    UnfrozenLand = 3,
    SnowLand = 4,
    Arctic = 5,
    Antarctic = 6,
    Desert = 7,
}

impl SurfaceType {
    /// The classified surface types, in table-row order
    pub const CLASSIFIED: [SurfaceType; 7] = [
        SurfaceType::DeepOcean,
        SurfaceType::ShallowOcean,
        SurfaceType::UnfrozenLand,
        SurfaceType::SnowLand,
        SurfaceType::Arctic,
        SurfaceType::Antarctic,
        SurfaceType::Desert,
    ];

    pub fn from_u8(code: u8) -> Option<SurfaceType> {
        match code {
            0 => Some(SurfaceType::Space),
            1 => Some(SurfaceType::DeepOcean),
            2 => Some(SurfaceType::ShallowOcean),
            3 => Some(SurfaceType::UnfrozenLand),
            4 => Some(SurfaceType::SnowLand),
            5 => Some(SurfaceType::Arctic),
            6 => Some(SurfaceType::Antarctic),
            7 => Some(SurfaceType::Desert),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Zero-based table row, `None` for space
    pub fn table_row(self) -> Option<usize> {
        match self {
            SurfaceType::Space => None,
            other => Some(other as usize - 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SurfaceType::Space => "Space",
            SurfaceType::DeepOcean => "DeepOcean",
            SurfaceType::ShallowOcean => "ShallowOcean",
            SurfaceType::UnfrozenLand => "UnfrozenLand",
            SurfaceType::SnowLand => "SnowLand",
            SurfaceType::Arctic => "Arctic",
            SurfaceType::Antarctic => "Antarctic",
            SurfaceType::Desert => "Desert",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Land classes of the navigation land mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LandClass {
    ShallowOcean = 0,
    Land = 1,
    Coastline = 2,
    ShallowInlandWater = 3,
    EphemeralWater = 4,
    DeepInlandWater = 5,
    ModerateOcean = 6,
    DeepOcean = 7,
}

impl LandClass {
    pub fn from_u8(code: u8) -> Option<LandClass> {
        match code {
            0 => Some(LandClass::ShallowOcean),
            1 => Some(LandClass::Land),
            2 => Some(LandClass::Coastline),
            3 => Some(LandClass::ShallowInlandWater),
            4 => Some(LandClass::EphemeralWater),
            5 => Some(LandClass::DeepInlandWater),
            6 => Some(LandClass::ModerateOcean),
            7 => Some(LandClass::DeepOcean),
            _ => None,
        }
    }

    /// Surface type before snow, ice and desert overrides
    pub fn base_surface(self) -> SurfaceType {
        match self {
            LandClass::DeepOcean => SurfaceType::DeepOcean,
            LandClass::ModerateOcean
            | LandClass::DeepInlandWater
            | LandClass::ShallowInlandWater
            | LandClass::ShallowOcean => SurfaceType::ShallowOcean,
            LandClass::Land | LandClass::Coastline | LandClass::EphemeralWater => {
                SurfaceType::UnfrozenLand
            }
        }
    }
}

/// Snow classes of the navigation snow mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SnowClass {
    NoSnow = 1,
    SeaIce = 2,
    Snow = 3,
}

impl SnowClass {
    pub fn from_u8(code: u8) -> Option<SnowClass> {
        match code {
            1 => Some(SnowClass::NoSnow),
            2 => Some(SnowClass::SeaIce),
            3 => Some(SnowClass::Snow),
            _ => None,
        }
    }
}

/// Desert classes of the navigation desert mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DesertClass {
    NoDesert = 0,
    NirDesert = 1,
    BrightDesert = 2,
}

impl DesertClass {
    pub fn from_u8(code: u8) -> Option<DesertClass> {
        match code {
            0 => Some(DesertClass::NoDesert),
            1 => Some(DesertClass::NirDesert),
            2 => Some(DesertClass::BrightDesert),
            _ => None,
        }
    }
}

/// Latitude separating the Antarctic from the rest of the snow cover
pub const ANTARCTIC_LATITUDE: f64 = -60.0;

/// Surface type of a single pixel from its navigation classes.
///
/// Overrides apply in order: snow-covered land, Arctic sea ice, Antarctic
/// snow or ice, then desert. Unknown land codes stay `Space`.
pub fn classify_surface(land: u8, snow: u8, desert: u8, latitude: f64) -> SurfaceType {
    let mut sft = LandClass::from_u8(land)
        .map(LandClass::base_surface)
        .unwrap_or(SurfaceType::Space);

    let snow = SnowClass::from_u8(snow);
    if latitude > ANTARCTIC_LATITUDE && snow == Some(SnowClass::Snow) {
        sft = SurfaceType::SnowLand;
    }
    if latitude >= 0.0 && snow == Some(SnowClass::SeaIce) {
        sft = SurfaceType::Arctic;
    }
    if latitude <= ANTARCTIC_LATITUDE
        && matches!(snow, Some(SnowClass::Snow) | Some(SnowClass::SeaIce))
    {
        sft = SurfaceType::Antarctic;
    }
    if matches!(
        DesertClass::from_u8(desert),
        Some(DesertClass::NirDesert) | Some(DesertClass::BrightDesert)
    ) {
        sft = SurfaceType::Desert;
    }
    sft
}

/// Derive the surface type grid from static navigation fields.
///
/// All inputs must share one shape. Pixels flagged in `space` are forced to
/// [`SurfaceType::Space`].
pub fn derive_surface_type(
    land: &Raster<u8>,
    snow: &Raster<u8>,
    desert: &Raster<u8>,
    latitude: &Raster<f64>,
    space: Option<&Array2<bool>>,
) -> Result<Raster<u8>> {
    let shape = land.grid_shape();
    snow.ensure_shape("snow mask", shape)?;
    desert.ensure_shape("desert mask", shape)?;
    latitude.ensure_shape("latitude", shape)?;
    if let Some(space) = space {
        shape.check("space mask", space.dim())?;
    }

    let mut sft = Zip::from(land.data())
        .and(snow.data())
        .and(desert.data())
        .and(latitude.data())
        .map_collect(|&l, &s, &d, &lat| classify_surface(l, s, d, lat).code());

    if let Some(space) = space {
        Zip::from(&mut sft).and(space).for_each(|v, &is_space| {
            if is_space {
                *v = SurfaceType::Space.code();
            }
        });
    }

    Ok(Raster::from_array(sft))
}

/// Validate that every pixel of `sft` is a known surface type code
pub fn validate_surface_codes(sft: &Raster<u8>, shape: GridShape) -> Result<()> {
    sft.ensure_shape("surface type", shape)?;
    if let Some(bad) = sft.data().iter().find(|&&c| SurfaceType::from_u8(c).is_none()) {
        return Err(Error::InvalidParameter {
            name: "surface_type",
            value: bad.to_string(),
            reason: "surface type codes must be in 0..=7".into(),
        });
    }
    Ok(())
}
