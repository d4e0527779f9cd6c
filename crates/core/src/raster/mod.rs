//! Pixel grid data structures

mod element;
mod grid;
mod masked;
mod neighborhood;
mod shape;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use masked::MaskedRaster;
pub use neighborhood::Neighborhood;
pub use shape::GridShape;
