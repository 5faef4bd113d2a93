//! Classifier training and prediction.
//!
//! `train` runs the feature pipeline in fit mode over the whole corpus,
//! holds out a stratified test set, fits the forest on the rest and scores
//! both the forest and the rule engine on the held-out rows. The result is a
//! [`ModelBundle`]: forest, fitted encoders and report, never mutated again.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

use super::forest::RandomForest;
use super::split::stratified_split;
use crate::config::{ForestConfig, TrainingConfig};
use crate::features::{encode, engineer, EncodeMode, FeatureEncoders, FeatureError, FeatureVector};
use crate::rules::RuleEngine;
use crate::types::{SoilSample, TrainingCorpus, TrainingRecord};

/// Errors that prevent a model from being trained
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Invalid sample count: {0}")]
    SampleCount(String),

    #[error("Training corpus has a single class ('{label}'), need at least two")]
    SingleClass { label: String },

    #[error("Degenerate split: {train} training rows, {test} held-out rows")]
    DegenerateSplit { train: usize, test: usize },

    #[error("No rows to fit the forest on")]
    EmptyTrainingSet,

    #[error("Feature matrix has {rows} rows but {labels} labels")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("Class index {class} out of range for {n_classes} classes")]
    ClassOutOfRange { class: usize, n_classes: usize },

    #[error("Feature encoding failed: {0}")]
    Feature(#[from] FeatureError),
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    /// Corpus size
    pub samples: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub n_classes: usize,
    /// Record count per label over the whole corpus
    pub class_distribution: BTreeMap<String, usize>,
    /// Forest accuracy on the held-out rows
    pub ml_accuracy: f64,
    /// Rule engine accuracy on the same held-out rows
    pub rule_accuracy: f64,
    pub seed: u64,
    pub test_fraction: f64,
    pub forest: ForestConfig,
}

/// A held-out row: its encoded features plus the record it came from.
struct HeldOutRow<'a> {
    record: &'a TrainingRecord,
    features: FeatureVector,
}

/// Trained forest with the encoders it was fit against.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    forest: RandomForest,
    encoders: FeatureEncoders,
    report: TrainingReport,
}

impl ModelBundle {
    /// Forest label for a raw sample, through the same feature pipeline
    /// used at training time.
    pub fn predict(&self, sample: &SoilSample) -> Result<String, FeatureError> {
        let (matrix, _) = encode(&[engineer(sample)], EncodeMode::Inference(&self.encoders))?;
        let features = matrix.first().ok_or(FeatureError::EmptyBatch)?;
        Ok(self.forest.predict(features).to_string())
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn encoders(&self) -> &FeatureEncoders {
        &self.encoders
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Fit a model bundle on `corpus`.
pub fn train(
    corpus: &TrainingCorpus,
    rules: &RuleEngine,
    training: &TrainingConfig,
    forest_params: &ForestConfig,
) -> Result<ModelBundle, TrainingError> {
    if corpus.is_empty() {
        return Err(TrainingError::EmptyCorpus);
    }

    let class_distribution = corpus.label_counts();
    let classes: Vec<String> = class_distribution.keys().cloned().collect();
    if classes.len() < 2 {
        return Err(TrainingError::SingleClass { label: classes.into_iter().next().unwrap_or_default() });
    }

    let engineered: Vec<_> = corpus.records.iter().map(|r| engineer(&r.sample)).collect();
    let (matrix, encoders) = encode(&engineered, EncodeMode::Fit)?;
    let encoders = encoders.into_owned();
    let labels: Vec<usize> = corpus
        .records
        .iter()
        .map(|r| classes.binary_search(&r.label).unwrap_or_default())
        .collect();

    let mut rng = StdRng::seed_from_u64(training.seed);
    let split = stratified_split(&labels, classes.len(), training.test_fraction, &mut rng);
    if split.train.is_empty() || split.test.is_empty() {
        return Err(TrainingError::DegenerateSplit { train: split.train.len(), test: split.test.len() });
    }

    let x_train: Vec<FeatureVector> = split.train.iter().map(|&i| matrix[i]).collect();
    let y_train: Vec<usize> = split.train.iter().map(|&i| labels[i]).collect();

    info!(
        samples = corpus.len(),
        train = x_train.len(),
        test = split.test.len(),
        classes = classes.len(),
        trees = forest_params.n_trees,
        "Fitting random forest"
    );
    let forest = RandomForest::fit(&x_train, &y_train, classes, forest_params, training.seed)?;

    let held_out: Vec<HeldOutRow<'_>> = split
        .test
        .iter()
        .map(|&i| HeldOutRow { record: &corpus.records[i], features: matrix[i] })
        .collect();

    let ml_correct = held_out
        .iter()
        .filter(|row| forest.predict(&row.features) == row.record.label)
        .count();
    let rule_correct = held_out
        .iter()
        .filter(|row| {
            let s = &row.record.sample;
            rules.recommend(s.nitrogen, s.phosphorous, s.potassium, &s.crop_type) == row.record.label
        })
        .count();

    let report = TrainingReport {
        trained_at: Utc::now(),
        samples: corpus.len(),
        train_size: x_train.len(),
        test_size: held_out.len(),
        n_classes: forest.classes().len(),
        class_distribution,
        ml_accuracy: ml_correct as f64 / held_out.len() as f64,
        rule_accuracy: rule_correct as f64 / held_out.len() as f64,
        seed: training.seed,
        test_fraction: training.test_fraction,
        forest: forest_params.clone(),
    };

    info!(
        ml_accuracy = report.ml_accuracy,
        rule_accuracy = report.rule_accuracy,
        "Model trained"
    );

    Ok(ModelBundle { forest, encoders, report })
}
