//! # NBCLM Parallel
//!
//! Execution strategies for independent units of work, such as the
//! classifiers of one fusion run.
//!
//! With the `parallel` feature (default) work is spread with Rayon, either on
//! the global pool or on a dedicated pool. Without it every mode runs
//! sequentially and produces the same results.

pub mod strategy;

pub use strategy::{num_cpus, ParallelStrategy, ProcessingMode};
