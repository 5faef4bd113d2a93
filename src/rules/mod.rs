//! Agronomic Rule Engine
//!
//! Maps current soil nutrient levels and a crop to a single fertilizer label:
//! 1. Look up the crop's requirement (fallback profile when unknown)
//! 2. Compute the deficit vector, clamped at zero
//! 3. Walk an ordered list of threshold rules; the first match wins
//!
//! Rule order is part of the semantics: several predicates overlap and
//! reordering them changes answers. The engine is pure and never fails.

pub mod explanation;

use crate::knowledge_base::NutrientKnowledgeBase;
use crate::types::{DeficitVector, NutrientProfile};

pub use explanation::explain;

/// Label returned when no rule fires.
pub const MAINTENANCE_LABEL: &str = "17-17-17";

/// One ordered decision rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub label: &'static str,
    pub applies: fn(&DeficitVector) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

/// Decision rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        label: "Urea",
        applies: |d| d.n_deficit > 80.0 && d.p_deficit < 20.0 && d.k_deficit < 20.0,
    },
    Rule {
        label: "DAP",
        applies: |d| d.p_deficit > 30.0 && d.n_deficit > 10.0,
    },
    Rule {
        label: "28-28",
        applies: |d| d.n_deficit > 15.0 && d.p_deficit > 15.0 && d.k_deficit < 15.0,
    },
    Rule {
        label: "17-17-17",
        applies: |d| {
            (d.n_deficit - d.p_deficit).abs() < 10.0
                && (d.n_deficit - d.k_deficit).abs() < 10.0
                && d.n_deficit > 10.0
        },
    },
    Rule {
        label: "14-35-14",
        applies: |d| d.p_deficit > 25.0 && d.k_deficit > 15.0,
    },
    Rule {
        label: "10-26-26",
        applies: |d| d.k_deficit > 20.0 && d.p_deficit > 20.0,
    },
    Rule {
        label: "20-20",
        applies: |d| d.n_deficit > 20.0 && d.p_deficit > 15.0,
    },
];

/// Rule-based recommender over a knowledge base.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    kb: NutrientKnowledgeBase,
}

impl RuleEngine {
    pub fn new(kb: NutrientKnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &NutrientKnowledgeBase {
        &self.kb
    }

    /// Deficits of the supplied nutrients against the crop's requirement.
    pub fn deficits(&self, nitrogen: f64, phosphorous: f64, potassium: f64, crop_type: &str) -> DeficitVector {
        let required = self.kb.requirement(crop_type);
        DeficitVector::between(&required, &NutrientProfile::new(nitrogen, phosphorous, potassium))
    }

    /// Fertilizer label for the given nutrient levels and crop.
    pub fn recommend(&self, nitrogen: f64, phosphorous: f64, potassium: f64, crop_type: &str) -> &'static str {
        let deficits = self.deficits(nitrogen, phosphorous, potassium, crop_type);
        Self::decide(&deficits)
    }

    /// Apply the ordered rules to a deficit vector.
    pub fn decide(deficits: &DeficitVector) -> &'static str {
        RULES
            .iter()
            .find(|rule| (rule.applies)(deficits))
            .map(|rule| rule.label)
            .unwrap_or(MAINTENANCE_LABEL)
    }

    /// Deficit narrative for the given nutrient levels and crop.
    pub fn explain(&self, nitrogen: f64, phosphorous: f64, potassium: f64, crop_type: &str) -> String {
        explain(&self.deficits(nitrogen, phosphorous, potassium, crop_type), crop_type)
    }
}
