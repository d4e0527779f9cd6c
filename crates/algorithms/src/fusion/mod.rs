//! Fusion of classifier outputs into the cloud mask product

pub mod category;
pub mod engine;

pub use category::CloudCategory;
pub use engine::{fuse, FusionConfig, FusionEngine, FusionResult};
