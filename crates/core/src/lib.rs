//! # NBCLM Core
//!
//! Core types, tables and I/O for the NBCLM Naive Bayes cloud mask.
//!
//! This crate provides:
//! - `Raster<T>`: Generic pixel grid shared by every per-pixel quantity
//! - `MaskedRaster`: Values paired with an explicit "observed" channel
//! - `SurfaceType`: The closed surface-type enumeration used to index tables
//! - `BinnedLikelihoodTable` / `TableStore`: Pre-trained lookup tables per month
//! - I/O for single-band GeoTIFF rasters and JSON tables

pub mod error;
pub mod io;
pub mod raster;
pub mod surface;
pub mod table;

pub use error::{Error, Result};
pub use raster::{GridShape, MaskedRaster, Raster, RasterElement};
pub use surface::SurfaceType;
pub use table::{
    posterior_probability, BinnedLikelihoodTable, Month, SurfaceBins, TableSource, TableStore,
    N_BINS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GridShape, MaskedRaster, Raster, RasterElement};
    pub use crate::surface::SurfaceType;
    pub use crate::table::{
        posterior_probability, BinnedLikelihoodTable, Month, SurfaceBins, TableSource, TableStore,
    };
}
