//! Input ranges the outer surfaces (CLI, HTTP) enforce before calling the core.
//!
//! The core never range-checks: it trusts its callers. These bounds mirror the
//! form the recommender was designed behind.

use serde::Serialize;

use super::SoilSample;
use crate::knowledge_base::{NutrientKnowledgeBase, OTHER_CATEGORY};

/// Closed numeric ranges for one sample.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InputBounds {
    pub temperature: (f64, f64),
    pub humidity: (f64, f64),
    pub moisture: (f64, f64),
    pub nutrient: (f64, f64),
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            temperature: (10.0, 40.0),
            humidity: (0.0, 100.0),
            moisture: (0.0, 100.0),
            nutrient: (0.0, 100.0),
        }
    }
}

impl InputBounds {
    /// Every violation in `sample`, as human-readable messages. Empty when valid.
    pub fn check(&self, sample: &SoilSample, kb: &NutrientKnowledgeBase) -> Vec<String> {
        let mut errors = Vec::new();

        Self::check_range("temperature", sample.temperature, self.temperature, &mut errors);
        Self::check_range("humidity", sample.humidity, self.humidity, &mut errors);
        Self::check_range("moisture", sample.moisture, self.moisture, &mut errors);
        Self::check_range("nitrogen", sample.nitrogen, self.nutrient, &mut errors);
        Self::check_range("phosphorous", sample.phosphorous, self.nutrient, &mut errors);
        Self::check_range("potassium", sample.potassium, self.nutrient, &mut errors);

        if sample.soil_type != OTHER_CATEGORY && !kb.soil_types().contains(&sample.soil_type.as_str()) {
            errors.push(format!("soil_type '{}' is not a supported soil type", sample.soil_type));
        }
        if sample.crop_type != OTHER_CATEGORY && !kb.is_known_crop(&sample.crop_type) {
            errors.push(format!("crop_type '{}' is not a supported crop", sample.crop_type));
        }

        errors
    }

    fn check_range(name: &str, value: f64, (lo, hi): (f64, f64), errors: &mut Vec<String>) {
        if !value.is_finite() || value < lo || value > hi {
            errors.push(format!("{name} ({value}) must be within [{lo}, {hi}]"));
        }
    }
}
