//! Naive Bayes fusion of classifier ratios

use super::category::CloudCategory;
use crate::classifier::{Classifier, ClassifierKind, Scene};
use crate::maybe_rayon::*;
use nbclm_core::raster::{GridShape, Raster};
use nbclm_core::table::posterior_probability;
use nbclm_core::{BinnedLikelihoodTable, Error, Result, SurfaceType, TableStore};
use nbclm_parallel::{ParallelStrategy, ProcessingMode};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Which classifiers to fuse and where the prior comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Classifiers whose ratios are multiplied, in order
    pub classifiers: Vec<ClassifierKind>,
    /// Classifier whose table supplies the prior of the fused posterior
    pub reference: ClassifierKind,
    /// How the classifiers are scheduled
    pub mode: ProcessingMode,
}

impl Default for FusionConfig {
    /// The operational classifier set
    fn default() -> Self {
        Self {
            classifiers: vec![
                ClassifierKind::TStd,
                ClassifierKind::Bt1185,
                ClassifierKind::T11,
                ClassifierKind::Btd37511Night,
                ClassifierKind::TmaxT,
                ClassifierKind::GeoColorRgb,
                ClassifierKind::Emiss375Day,
                ClassifierKind::Emiss375Night,
            ],
            reference: ClassifierKind::T11,
            mode: ProcessingMode::default(),
        }
    }
}

impl FusionConfig {
    /// Table ids needed by this configuration, without duplicates
    pub fn table_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = Vec::with_capacity(self.classifiers.len() + 1);
        for kind in self.classifiers.iter().chain(std::iter::once(&self.reference)) {
            if !ids.contains(&kind.table_id()) {
                ids.push(kind.table_id());
            }
        }
        ids
    }
}

/// Fused posterior probability and cloud mask
#[derive(Debug, Clone)]
pub struct FusionResult {
    /// Posterior probability of cloud; NaN outside the classification domain
    pub probability: Raster<f64>,
    /// Category codes (see [`CloudCategory`])
    pub category: Raster<u8>,
}

impl FusionResult {
    /// Pixel count per category, in [`CloudCategory::ALL`] order
    pub fn category_counts(&self) -> Vec<(CloudCategory, usize)> {
        let mut counts = [0usize; 6];
        for &code in self.category.data().iter() {
            if let Some(i) = CloudCategory::ALL.iter().position(|c| c.code() == code) {
                counts[i] += 1;
            }
        }
        CloudCategory::ALL.iter().copied().zip(counts).collect()
    }
}

/// Runs a set of classifiers over a scene and fuses their ratios.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    classifiers: Vec<Classifier>,
    reference: Arc<BinnedLikelihoodTable>,
    mode: ProcessingMode,
}

impl FusionEngine {
    /// Bind every configured classifier to its table.
    ///
    /// Fails with [`Error::MissingTable`] if the store lacks any of them.
    pub fn new(config: &FusionConfig, store: &TableStore) -> Result<Self> {
        if config.classifiers.is_empty() {
            return Err(Error::InvalidParameter {
                name: "classifiers",
                value: "[]".into(),
                reason: "at least one classifier is required".into(),
            });
        }
        let classifiers = config
            .classifiers
            .iter()
            .map(|&kind| Classifier::from_store(kind, store))
            .collect::<Result<Vec<_>>>()?;
        let reference = store.get(config.reference.table_id())?;

        Ok(Self {
            classifiers,
            reference,
            mode: config.mode,
        })
    }

    pub fn classifiers(&self) -> &[Classifier] {
        &self.classifiers
    }

    /// Classify a scene.
    pub fn classify(&self, scene: &Scene) -> Result<FusionResult> {
        let start = Instant::now();
        let ratios = self
            .mode
            .par_map(0..self.classifiers.len(), |i| self.classifiers[i].run(scene, false))
            .into_iter()
            .map(|inference| inference.map(|i| i.ratio))
            .collect::<Result<Vec<_>>>()?;

        let result = fuse(&ratios, &self.reference, scene.surface_type(), scene.space())?;

        let counts = result.category_counts();
        for (category, n) in &counts {
            debug!("{:>16}: {}", category.name(), n);
        }
        info!(
            "Fused {} classifiers over {} pixels in {:.2?}",
            self.classifiers.len(),
            scene.shape().len(),
            start.elapsed()
        );
        Ok(result)
    }
}

/// Fuse classifier ratios into a posterior probability and category grid.
///
/// The ratios are multiplied and the product is turned into a probability
/// with the prior of `reference` for each pixel's surface type. Pixels with
/// surface type 0 or flagged as space are categorized as
/// [`CloudCategory::Space`]; pixels whose surface type has no table row or
/// whose probability is not finite are [`CloudCategory::Invalid`].
pub fn fuse(
    ratios: &[Raster<f64>],
    reference: &BinnedLikelihoodTable,
    sft: &Raster<u8>,
    space: &Array2<bool>,
) -> Result<FusionResult> {
    let shape = GridShape::from(sft.shape());
    shape.check("space mask", space.dim())?;

    let mut total = Array2::from_elem(sft.shape(), 1.0f64);
    for (i, ratio) in ratios.iter().enumerate() {
        ratio.ensure_shape(&format!("ratio {}", i), shape)?;
        Zip::from(&mut total)
            .and(ratio.data())
            .for_each(|t, &r| *t *= r);
    }

    let (rows, cols) = sft.shape();
    let codes = sft.data();

    let pixels: Vec<(f64, u8)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![(f64::NAN, CloudCategory::Space.code()); cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let code = codes[[row, col]];
                if code == SurfaceType::Space.code() || space[[row, col]] {
                    continue;
                }
                let prob = match reference.prior_yes(code) {
                    Some(prior) => posterior_probability(total[[row, col]], prior),
                    None => f64::NAN,
                };
                *out = (prob, CloudCategory::from_probability(prob).code());
            }
            row_data
        })
        .collect();

    let (prob, category): (Vec<f64>, Vec<u8>) = pixels.into_iter().unzip();
    let prob = Array2::from_shape_vec((rows, cols), prob).map_err(|e| Error::Other(e.to_string()))?;
    let category =
        Array2::from_shape_vec((rows, cols), category).map_err(|e| Error::Other(e.to_string()))?;

    let mut probability = Raster::from_array(prob);
    probability.set_nodata(Some(f64::NAN));
    Ok(FusionResult {
        probability,
        category: Raster::from_array(category),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nbclm_core::SurfaceBins;

    fn reference(prior: f64) -> BinnedLikelihoodTable {
        BinnedLikelihoodTable::uniform("T_11", SurfaceBins::uniform(0.0, 1.0, 1.0, prior)).unwrap()
    }

    #[test]
    fn test_neutral_ratios_return_prior() {
        let sft = Raster::filled(3, 3, 2u8);
        let space = Array2::from_elem((3, 3), false);
        let ratios = vec![Raster::filled(3, 3, 1.0); 4];

        let out = fuse(&ratios, &reference(0.3), &sft, &space).unwrap();
        for &p in out.probability.data().iter() {
            assert_relative_eq!(p, 0.3, epsilon = 1e-12);
        }
        assert!(out.category.data().iter().all(|&c| c == CloudCategory::ProbablyClear.code()));
    }

    #[test]
    fn test_product_of_ratios() {
        let sft = Raster::filled(1, 1, 1u8);
        let space = Array2::from_elem((1, 1), false);
        let ratios = vec![Raster::filled(1, 1, 0.5), Raster::filled(1, 1, 0.2)];
        let out = fuse(&ratios, &reference(0.5), &sft, &space).unwrap();
        // r = 0.1, prior 0.5: 1 / (1 + 0.2 - 0.1)
        assert_relative_eq!(out.probability.get(0, 0).unwrap(), 1.0 / 1.1, epsilon = 1e-12);
        assert_eq!(out.category.get(0, 0).unwrap(), CloudCategory::Cloudy.code());
    }

    #[test]
    fn test_space_and_unknown_surface() {
        let sft = Raster::from_vec(vec![0u8, 9, 4, 4], 2, 2).unwrap();
        let space = Array2::from_shape_vec((2, 2), vec![false, false, true, false]).unwrap();
        let ratios = vec![Raster::filled(2, 2, 1.0)];
        let out = fuse(&ratios, &reference(0.05), &sft, &space).unwrap();
        assert_eq!(
            out.category.data().iter().copied().collect::<Vec<_>>(),
            vec![126, 4, 126, 3]
        );
        assert!(out.probability.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_ratio_shape_checked() {
        let sft = Raster::filled(2, 2, 1u8);
        let space = Array2::from_elem((2, 2), false);
        let ratios = vec![Raster::filled(2, 3, 1.0)];
        assert!(fuse(&ratios, &reference(0.5), &sft, &space).is_err());
    }

    #[test]
    fn test_default_config_ids() {
        let config = FusionConfig::default();
        let ids = config.table_ids();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains(&"T_11"));
    }

    #[test]
    fn test_config_from_json() {
        let config: FusionConfig =
            serde_json::from_str(r#"{"classifiers": ["T_11", "Btd_11_85"], "mode": "sequential"}"#)
                .unwrap();
        assert_eq!(config.classifiers, vec![ClassifierKind::T11, ClassifierKind::Bt1185]);
        assert_eq!(config.reference, ClassifierKind::T11);
        assert_eq!(config.mode, ProcessingMode::Sequential);
    }
}
