//! Orchestrator output types: RecommendationResult, ConfidenceLevel, MlRecommendation

use serde::{Deserialize, Serialize};

use super::{DeficitVector, NutrientProfile};

/// Agreement between the rule engine and the classifier.
///
/// Only two levels exist: there is no "Low".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// Classifier absent, unavailable, or agrees with the rules
    High,
    /// Classifier disagrees with the rules
    Medium,
}

impl ConfidenceLevel {
    /// Confidence from the primary label and the classifier outcome.
    pub fn from_agreement(primary: &str, secondary: Option<&MlRecommendation>) -> Self {
        match secondary {
            Some(MlRecommendation::Predicted { label }) if label != primary => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the classifier cross-check, when a model is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MlRecommendation {
    /// The classifier produced a label
    Predicted { label: String },
    /// The classifier path failed (e.g. unknown category); the rule answer stands
    Unavailable { reason: String },
}

impl MlRecommendation {
    /// Predicted label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Predicted { label } => Some(label),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Hybrid recommendation for one soil sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Rule engine label (always present)
    pub primary_recommendation: String,
    /// Classifier outcome; `None` when no model has been trained
    pub ml_recommendation: Option<MlRecommendation>,
    pub confidence: ConfidenceLevel,
    /// Deficit narrative
    pub explanation: String,
    /// Deficits the rule engine decided on
    pub deficits: DeficitVector,
    /// NPK composition of the primary recommendation
    pub fertilizer_npk: Option<NutrientProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_without_classifier_is_high() {
        assert_eq!(ConfidenceLevel::from_agreement("DAP", None), ConfidenceLevel::High);
    }

    #[test]
    fn test_confidence_on_agreement_and_disagreement() {
        let same = MlRecommendation::Predicted { label: "DAP".into() };
        let other = MlRecommendation::Predicted { label: "Urea".into() };
        assert_eq!(ConfidenceLevel::from_agreement("DAP", Some(&same)), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_agreement("DAP", Some(&other)), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_unavailable_classifier_keeps_high_confidence() {
        let failed = MlRecommendation::Unavailable { reason: "unknown soil".into() };
        assert_eq!(ConfidenceLevel::from_agreement("DAP", Some(&failed)), ConfidenceLevel::High);
        assert_eq!(failed.label(), None);
    }

    #[test]
    fn test_ml_recommendation_serializes_with_status_tag() {
        let v = serde_json::to_value(MlRecommendation::Predicted { label: "Urea".into() }).unwrap();
        assert_eq!(v["status"], "predicted");
        assert_eq!(v["label"], "Urea");
    }
}
