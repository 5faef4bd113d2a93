//! Labeled training data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SoilSample;

/// A soil sample with the fertilizer label assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub sample: SoilSample,
    /// Fertilizer name
    pub label: String,
}

/// Ordered collection of labeled samples, built once per training session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingCorpus {
    pub records: Vec<TrainingRecord>,
}

impl TrainingCorpus {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record count per label, sorted by label.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<TrainingRecord> for TrainingCorpus {
    fn from_iter<I: IntoIterator<Item = TrainingRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
