//! Nutrient Knowledge Base
//!
//! Static reference tables loaded once at construction and never mutated:
//! - Fertilizer NPK composition (percent N, P2O5, K2O)
//! - Per-crop nutrient requirement targets
//! - Soil types the synthetic generator draws from
//!
//! Table order is significant: the synthetic generator samples crops and soils
//! by index, so reordering a table changes every seeded corpus.

use crate::types::NutrientProfile;

/// Requirement used for any crop not in the table.
pub const FALLBACK_REQUIREMENT: NutrientProfile = NutrientProfile::new(100.0, 50.0, 50.0);

/// Catch-all category offered by the input form for both soil and crop.
pub const OTHER_CATEGORY: &str = "Other";

const FERTILIZERS: &[(&str, NutrientProfile)] = &[
    ("Urea", NutrientProfile::new(46.0, 0.0, 0.0)),
    ("DAP", NutrientProfile::new(18.0, 46.0, 0.0)),
    ("10-26-26", NutrientProfile::new(10.0, 26.0, 26.0)),
    ("14-35-14", NutrientProfile::new(14.0, 35.0, 14.0)),
    ("17-17-17", NutrientProfile::new(17.0, 17.0, 17.0)),
    ("20-20", NutrientProfile::new(20.0, 20.0, 0.0)),
    ("28-28", NutrientProfile::new(28.0, 28.0, 0.0)),
];

const CROP_REQUIREMENTS: &[(&str, NutrientProfile)] = &[
    ("Maize", NutrientProfile::new(120.0, 60.0, 40.0)),
    ("Rice", NutrientProfile::new(100.0, 50.0, 50.0)),
    ("Paddy", NutrientProfile::new(100.0, 50.0, 50.0)),
    ("Wheat", NutrientProfile::new(150.0, 60.0, 40.0)),
    ("Cotton", NutrientProfile::new(110.0, 50.0, 60.0)),
    ("Sugarcane", NutrientProfile::new(200.0, 80.0, 120.0)),
    ("Ground Nuts", NutrientProfile::new(25.0, 75.0, 50.0)),
    ("Pulses", NutrientProfile::new(30.0, 60.0, 40.0)),
    ("Millets", NutrientProfile::new(80.0, 40.0, 30.0)),
    ("Tobacco", NutrientProfile::new(120.0, 60.0, 100.0)),
    ("Oil seeds", NutrientProfile::new(100.0, 60.0, 40.0)),
    ("Barley", NutrientProfile::new(120.0, 60.0, 40.0)),
];

const SOIL_TYPES: &[&str] = &["Sandy", "Loamy", "Black", "Red", "Clayey"];

/// Fertilizer and crop reference data.
#[derive(Debug, Clone)]
pub struct NutrientKnowledgeBase {
    fertilizers: Vec<(String, NutrientProfile)>,
    crops: Vec<(String, NutrientProfile)>,
    soil_types: Vec<&'static str>,
}

impl Default for NutrientKnowledgeBase {
    fn default() -> Self {
        Self {
            fertilizers: FERTILIZERS.iter().map(|(n, p)| (n.to_string(), *p)).collect(),
            crops: CROP_REQUIREMENTS.iter().map(|(n, p)| (n.to_string(), *p)).collect(),
            soil_types: SOIL_TYPES.to_vec(),
        }
    }
}

impl NutrientKnowledgeBase {
    /// Requirement target for `crop`, or [`FALLBACK_REQUIREMENT`] when unknown.
    ///
    /// Never fails: the rule engine must always be able to answer.
    pub fn requirement(&self, crop: &str) -> NutrientProfile {
        self.crops
            .iter()
            .find(|(name, _)| name == crop)
            .map(|(_, profile)| *profile)
            .unwrap_or(FALLBACK_REQUIREMENT)
    }

    pub fn is_known_crop(&self, crop: &str) -> bool {
        self.crops.iter().any(|(name, _)| name == crop)
    }

    /// NPK composition of a fertilizer label.
    pub fn composition(&self, fertilizer: &str) -> Option<NutrientProfile> {
        self.fertilizers
            .iter()
            .find(|(name, _)| name == fertilizer)
            .map(|(_, profile)| *profile)
    }

    /// Crop names in table order.
    pub fn crops(&self) -> Vec<&str> {
        self.crops.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// All crop requirement entries in table order.
    pub fn crop_requirements(&self) -> &[(String, NutrientProfile)] {
        &self.crops
    }

    /// All fertilizer composition entries in table order.
    pub fn fertilizers(&self) -> &[(String, NutrientProfile)] {
        &self.fertilizers
    }

    pub fn soil_types(&self) -> &[&'static str] {
        &self.soil_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_crop_requirement() {
        let kb = NutrientKnowledgeBase::default();
        assert_eq!(kb.requirement("Wheat"), NutrientProfile::new(150.0, 60.0, 40.0));
        assert_eq!(kb.requirement("Ground Nuts"), NutrientProfile::new(25.0, 75.0, 50.0));
    }

    #[test]
    fn test_unknown_crop_falls_back() {
        let kb = NutrientKnowledgeBase::default();
        assert!(!kb.is_known_crop("Quinoa"));
        assert_eq!(kb.requirement("Quinoa"), FALLBACK_REQUIREMENT);
        assert_eq!(kb.requirement(""), NutrientProfile::new(100.0, 50.0, 50.0));
    }

    #[test]
    fn test_crop_lookup_is_case_sensitive() {
        let kb = NutrientKnowledgeBase::default();
        assert!(kb.is_known_crop("Maize"));
        assert!(!kb.is_known_crop("maize"));
    }

    #[test]
    fn test_fertilizer_composition() {
        let kb = NutrientKnowledgeBase::default();
        assert_eq!(kb.composition("DAP"), Some(NutrientProfile::new(18.0, 46.0, 0.0)));
        assert_eq!(kb.composition("Potash"), None);
        assert_eq!(kb.fertilizers().len(), 7);
    }

    #[test]
    fn test_table_order_is_stable() {
        let kb = NutrientKnowledgeBase::default();
        let crops = kb.crops();
        assert_eq!(crops.len(), 12);
        assert_eq!(crops[0], "Maize");
        assert_eq!(crops[11], "Barley");
        assert_eq!(kb.soil_types(), &["Sandy", "Loamy", "Black", "Red", "Clayey"]);
    }
}
