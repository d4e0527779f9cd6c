//! Scene inputs shared by all classifiers

use nbclm_core::raster::{GridShape, MaskedRaster, Raster};
use nbclm_core::{Error, Result, SurfaceType};
use ndarray::{Array2, Zip};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Spectral observation channels of the imager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Ref047,
    Ref065,
    Ref083,
    Ref137,
    Ref161,
    Ref222,
    Bt372Low,
    Bt372High,
    Bt625,
    Bt710,
    Bt850,
    Bt1080,
    Bt1200,
    Bt1350,
    /// 3.75 µm pseudo-emissivity
    Ems372,
    /// Clear-sky composite of the 0.65 µm reflectance
    Ref065Clear,
    GeoColorRed,
    GeoColorGreen,
    GeoColorBlue,
}

impl Channel {
    pub const ALL: [Channel; 19] = [
        Channel::Ref047,
        Channel::Ref065,
        Channel::Ref083,
        Channel::Ref137,
        Channel::Ref161,
        Channel::Ref222,
        Channel::Bt372Low,
        Channel::Bt372High,
        Channel::Bt625,
        Channel::Bt710,
        Channel::Bt850,
        Channel::Bt1080,
        Channel::Bt1200,
        Channel::Bt1350,
        Channel::Ems372,
        Channel::Ref065Clear,
        Channel::GeoColorRed,
        Channel::GeoColorGreen,
        Channel::GeoColorBlue,
    ];

    /// Conventional name, also used as the file stem of scene GeoTIFFs
    pub fn name(self) -> &'static str {
        match self {
            Channel::Ref047 => "ref_047",
            Channel::Ref065 => "ref_065",
            Channel::Ref083 => "ref_083",
            Channel::Ref137 => "ref_137",
            Channel::Ref161 => "ref_161",
            Channel::Ref222 => "ref_222",
            Channel::Bt372Low => "bt_372_low",
            Channel::Bt372High => "bt_372_high",
            Channel::Bt625 => "bt_625",
            Channel::Bt710 => "bt_710",
            Channel::Bt850 => "bt_850",
            Channel::Bt1080 => "bt_1080",
            Channel::Bt1200 => "bt_1200",
            Channel::Bt1350 => "bt_1350",
            Channel::Ems372 => "ems_372",
            Channel::Ref065Clear => "ref_065_clear",
            Channel::GeoColorRed => "geocolor_red",
            Channel::GeoColorGreen => "geocolor_green",
            Channel::GeoColorBlue => "geocolor_blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::InvalidParameter {
                name: "channel",
                value: s.to_string(),
                reason: "unknown channel".into(),
            })
    }
}

/// Viewing and illumination geometry, in degrees (airmass is unitless)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Angle {
    SunZenith,
    SatelliteZenith,
    SunGlint,
    ScatteringAngle,
    Airmass,
}

impl Angle {
    pub const ALL: [Angle; 5] = [
        Angle::SunZenith,
        Angle::SatelliteZenith,
        Angle::SunGlint,
        Angle::ScatteringAngle,
        Angle::Airmass,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Angle::SunZenith => "sun_zenith",
            Angle::SatelliteZenith => "satellite_zenith",
            Angle::SunGlint => "sun_glint",
            Angle::ScatteringAngle => "scattering_angle",
            Angle::Airmass => "airmass",
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All per-pixel inputs of one satellite scene.
///
/// The surface type grid fixes the scene shape; every other grid is checked
/// against it when added. Grids are read-only once the scene is built.
#[derive(Debug, Clone)]
pub struct Scene {
    shape: GridShape,
    surface_type: Raster<u8>,
    space: Array2<bool>,
    bands: HashMap<Channel, MaskedRaster>,
    angles: HashMap<Angle, Raster<f64>>,
    elevation: Option<Raster<f64>>,
    coastal: Option<Array2<bool>>,
    snow: Option<Array2<bool>>,
}

impl Scene {
    /// Start a scene from its surface type grid.
    ///
    /// Pixels with surface type 0 are marked as space.
    pub fn new(surface_type: Raster<u8>) -> Self {
        let space = surface_type
            .data()
            .mapv(|s| s == SurfaceType::Space.code());
        Self {
            shape: surface_type.grid_shape(),
            surface_type,
            space,
            bands: HashMap::new(),
            angles: HashMap::new(),
            elevation: None,
            coastal: None,
            snow: None,
        }
    }

    /// Add an explicit space mask, on top of surface type 0
    pub fn with_space(mut self, space: Array2<bool>) -> Result<Self> {
        self.shape.check("space", space.dim())?;
        Zip::from(&mut self.space)
            .and(&space)
            .for_each(|s, &extra| *s |= extra);
        Ok(self)
    }

    pub fn with_band(mut self, channel: Channel, band: MaskedRaster) -> Result<Self> {
        band.ensure_shape(channel.name(), self.shape)?;
        self.bands.insert(channel, band);
        Ok(self)
    }

    pub fn with_angle(mut self, angle: Angle, values: Raster<f64>) -> Result<Self> {
        values.ensure_shape(angle.name(), self.shape)?;
        self.angles.insert(angle, values);
        Ok(self)
    }

    /// Surface elevation in metres
    pub fn with_elevation(mut self, elevation: Raster<f64>) -> Result<Self> {
        elevation.ensure_shape("elevation", self.shape)?;
        self.elevation = Some(elevation);
        Ok(self)
    }

    pub fn with_coastal(mut self, coastal: Array2<bool>) -> Result<Self> {
        self.shape.check("coastal", coastal.dim())?;
        self.coastal = Some(coastal);
        Ok(self)
    }

    pub fn with_snow(mut self, snow: Array2<bool>) -> Result<Self> {
        self.shape.check("snow", snow.dim())?;
        self.snow = Some(snow);
        Ok(self)
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn surface_type(&self) -> &Raster<u8> {
        &self.surface_type
    }

    /// Space mask (explicit mask OR surface type 0)
    pub fn space(&self) -> &Array2<bool> {
        &self.space
    }

    pub fn band(&self, channel: Channel) -> Result<&MaskedRaster> {
        self.bands
            .get(&channel)
            .ok_or_else(|| Error::MissingInput(channel.name().to_string()))
    }

    pub fn angle(&self, angle: Angle) -> Result<&Raster<f64>> {
        self.angles
            .get(&angle)
            .ok_or_else(|| Error::MissingInput(angle.name().to_string()))
    }

    pub fn elevation(&self) -> Result<&Raster<f64>> {
        self.elevation
            .as_ref()
            .ok_or_else(|| Error::MissingInput("elevation".into()))
    }

    pub fn coastal(&self) -> Result<&Array2<bool>> {
        self.coastal
            .as_ref()
            .ok_or_else(|| Error::MissingInput("coastal".into()))
    }

    pub fn snow(&self) -> Result<&Array2<bool>> {
        self.snow
            .as_ref()
            .ok_or_else(|| Error::MissingInput("snow".into()))
    }
}
