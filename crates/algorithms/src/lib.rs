//! # NBCLM Algorithms
//!
//! Per-pixel Naive Bayes cloud classification.
//!
//! ## Modules
//!
//! - **statistics**: Masked moving-window statistics
//! - **likelihood**: Binned table lookup shared by every classifier
//! - **classifier**: Scene inputs, feature recipes, validity predicates and the classifier catalogue
//! - **fusion**: Product of classifier ratios, posterior probability and cloud categories
//! - **evaluation**: Contingency counts, skill scores and category shifts

pub(crate) mod maybe_rayon;

pub mod classifier;
pub mod evaluation;
pub mod fusion;
pub mod likelihood;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{
        Angle, Channel, Classifier, ClassifierKind, Feature, Scene, Validity,
    };
    pub use crate::evaluation::{category_shift, contingency, Contingency, SkillScores};
    pub use crate::fusion::{fuse, CloudCategory, FusionConfig, FusionEngine, FusionResult};
    pub use crate::likelihood::{lookup, Inference};
    pub use crate::statistics::{window_statistic, WindowParams, WindowStatistic};
    pub use nbclm_core::prelude::*;
    pub use nbclm_parallel::ProcessingMode;
}
