//! I/O operations for scene grids and products

mod native;

pub use native::{
    read_geotiff, read_geotiff_from_buffer, read_masked_geotiff, write_category_geotiff,
    write_geotiff, write_geotiff_to_buffer, GeoTiffOptions, SampleFormat,
};
