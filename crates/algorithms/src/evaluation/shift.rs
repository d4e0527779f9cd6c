//! Per-pixel category shift between two cloud masks

use crate::fusion::CloudCategory;
use nbclm_core::raster::Raster;
use nbclm_core::Result;
use ndarray::Zip;

/// Shift class codes
pub const SHIFT_UNDEFINED: u8 = 0;
pub const SHIFT_CLOUDY: u8 = 1;
pub const SHIFT_SMALL_CLOUDY: u8 = 2;
pub const SHIFT_NONE: u8 = 3;
pub const SHIFT_SMALL_CLEAR: u8 = 4;
pub const SHIFT_CLEAR: u8 = 5;

/// Shift class of one pixel, with Δ = reference − other.
pub fn shift_class(reference: u8, other: u8) -> u8 {
    let sky = |c: u8| CloudCategory::from_u8(c).is_some_and(CloudCategory::is_sky);
    if !sky(reference) || !sky(other) {
        return SHIFT_UNDEFINED;
    }
    match reference as i16 - other as i16 {
        ..=-2 => SHIFT_CLOUDY,
        -1 => SHIFT_SMALL_CLOUDY,
        0 => SHIFT_NONE,
        1 => SHIFT_SMALL_CLEAR,
        _ => SHIFT_CLEAR,
    }
}

/// Shift class grid between a reference mask and another mask
pub fn category_shift(reference: &Raster<u8>, other: &Raster<u8>) -> Result<Raster<u8>> {
    other.ensure_shape("other", reference.grid_shape())?;
    let shift = Zip::from(reference.data())
        .and(other.data())
        .map_collect(|&r, &o| shift_class(r, o));
    Ok(Raster::from_array(shift))
}
