//! Statistical kernels for masked rasters
//!
//! - **window**: Moving window statistics over observed neighbours

pub mod window;

pub use window::{window_statistic, WindowParams, WindowStatistic};
