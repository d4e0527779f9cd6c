//! Comparison of cloud masks
//!
//! - **metrics**: Contingency counts and skill scores against a reference
//! - **shift**: Per-pixel category shift classes

pub mod metrics;
pub mod shift;

pub use metrics::{contingency, Contingency, SkillScores};
pub use shift::{category_shift, shift_class};
