//! Recommendation Orchestrator
//!
//! Combines the rule engine (always authoritative) with the optional
//! classifier cross-check:
//!
//! 1. Primary label from the rule engine, which cannot fail
//! 2. Secondary label from the current model bundle, if one is installed
//! 3. Confidence from their agreement (High / Medium)
//! 4. Deficit explanation
//!
//! The model bundle lives in an `ArcSwapOption`. Each request reads one
//! snapshot; training builds a complete new bundle and publishes it with a
//! single store, so requests never observe a half-trained model.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ForestConfig, TrainingConfig};
use crate::ml_engine::{self, ModelBundle, TrainingError};
use crate::rules::RuleEngine;
use crate::synthetic::SyntheticGenerator;
use crate::types::{ConfidenceLevel, MlRecommendation, RecommendationResult, SoilSample, TrainingCorpus};

pub struct Recommender {
    rules: RuleEngine,
    model: ArcSwapOption<ModelBundle>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(RuleEngine::default())
    }
}

impl Recommender {
    /// Rule-only recommender; no model until one is trained or installed.
    pub fn new(rules: RuleEngine) -> Self {
        Self { rules, model: ArcSwapOption::empty() }
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// Hybrid recommendation for one sample.
    pub fn recommend(&self, sample: &SoilSample) -> RecommendationResult {
        let deficits = self
            .rules
            .deficits(sample.nitrogen, sample.phosphorous, sample.potassium, &sample.crop_type);
        let primary = RuleEngine::decide(&deficits);

        let ml_recommendation = self.model.load_full().map(|model| match model.predict(sample) {
            Ok(label) => MlRecommendation::Predicted { label },
            Err(e) => {
                warn!(error = %e, "Classifier cross-check unavailable, using rule result only");
                MlRecommendation::Unavailable { reason: e.to_string() }
            }
        });

        let confidence = ConfidenceLevel::from_agreement(primary, ml_recommendation.as_ref());

        RecommendationResult {
            primary_recommendation: primary.to_string(),
            ml_recommendation,
            confidence,
            explanation: crate::rules::explain(&deficits, &sample.crop_type),
            deficits,
            fertilizer_npk: self.rules.knowledge_base().composition(primary),
        }
    }

    /// Train on `corpus` and publish the resulting bundle.
    pub fn train(
        &self,
        corpus: &TrainingCorpus,
        training: &TrainingConfig,
        forest: &ForestConfig,
    ) -> Result<Arc<ModelBundle>, TrainingError> {
        let bundle = ml_engine::train(corpus, &self.rules, training, forest)?;
        Ok(self.install_model(bundle))
    }

    /// Generate a synthetic corpus from `training.samples` and `training.seed`,
    /// then train on it.
    pub fn train_synthetic(
        &self,
        training: &TrainingConfig,
        forest: &ForestConfig,
    ) -> Result<Arc<ModelBundle>, TrainingError> {
        training.check_samples().map_err(TrainingError::SampleCount)?;
        let corpus = SyntheticGenerator::new(&self.rules).generate_seeded(training.samples, training.seed);
        self.train(&corpus, training, forest)
    }

    /// Publish `bundle` as the current model, replacing any previous one.
    pub fn install_model(&self, bundle: ModelBundle) -> Arc<ModelBundle> {
        let bundle = Arc::new(bundle);
        self.model.store(Some(Arc::clone(&bundle)));
        info!(
            ml_accuracy = bundle.report().ml_accuracy,
            classes = bundle.report().n_classes,
            "Model bundle installed"
        );
        bundle
    }

    /// Snapshot of the current model bundle.
    pub fn model(&self) -> Option<Arc<ModelBundle>> {
        self.model.load_full()
    }

    pub fn is_trained(&self) -> bool {
        self.model.load().is_some()
    }
}
