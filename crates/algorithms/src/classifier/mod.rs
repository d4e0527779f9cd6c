//! Naive Bayes classifiers
//!
//! A classifier pairs one [`ClassifierKind`] (feature recipe and validity
//! predicates) with the trained table for the scene month. All classifiers
//! share the lookup kernel in [`crate::likelihood`].

pub mod feature;
pub mod inputs;
pub mod kind;
pub mod validity;

pub use feature::Feature;
pub use inputs::{Angle, Channel, Scene};
pub use kind::ClassifierKind;
pub use validity::Validity;

use crate::likelihood::{lookup, Inference};
use nbclm_core::raster::{MaskedRaster, Raster};
use nbclm_core::{BinnedLikelihoodTable, Error, Result, TableStore};
use ndarray::Array2;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A classifier bound to its table
#[derive(Debug, Clone)]
pub struct Classifier {
    kind: ClassifierKind,
    table: Arc<BinnedLikelihoodTable>,
}

impl Classifier {
    pub fn new(kind: ClassifierKind, table: Arc<BinnedLikelihoodTable>) -> Result<Self> {
        if table.name() != kind.table_id() {
            return Err(Error::InvalidTable {
                table: table.name().to_string(),
                reason: format!("cannot back classifier {}", kind.table_id()),
            });
        }
        Ok(Self { kind, table })
    }

    /// Bind `kind` to its table in `store`
    pub fn from_store(kind: ClassifierKind, store: &TableStore) -> Result<Self> {
        Self::new(kind, store.get(kind.table_id())?)
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    pub fn table(&self) -> &BinnedLikelihoodTable {
        &self.table
    }

    pub fn prepare_feature(&self, scene: &Scene) -> Result<MaskedRaster> {
        self.kind.feature().compute(scene)
    }

    pub fn prepare_valid_mask(&self, scene: &Scene) -> Result<Array2<bool>> {
        validity::combine(scene, &self.kind.validity())
    }

    pub fn infer(
        &self,
        feature: &MaskedRaster,
        sft: &Raster<u8>,
        valid: &Array2<bool>,
        space: &Array2<bool>,
        want_probability: bool,
    ) -> Result<Inference> {
        lookup(&self.table, feature, sft, valid, space, want_probability)
    }

    /// Feature, validity and lookup in one call
    pub fn run(&self, scene: &Scene, want_probability: bool) -> Result<Inference> {
        let start = Instant::now();
        let feature = self.prepare_feature(scene)?;
        let valid = self.prepare_valid_mask(scene)?;
        let inference = self.infer(
            &feature,
            scene.surface_type(),
            &valid,
            scene.space(),
            want_probability,
        )?;
        debug!(
            "{}: {} valid pixels in {:.2?}",
            self.kind,
            inference.valid_count,
            start.elapsed()
        );
        Ok(inference)
    }
}
