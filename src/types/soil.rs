//! Soil, nutrient and deficit types.

use serde::{Deserialize, Serialize};

/// N, P, K amounts (mg/kg or kg/ha-equivalent).
///
/// Used both as a crop's requirement target and as a fertilizer's composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl NutrientProfile {
    pub const fn new(n: f64, p: f64, k: f64) -> Self {
        Self { n, p, k }
    }
}

/// One soil test plus the crop it is meant for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    /// Ambient temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Soil moisture (%)
    pub moisture: f64,
    /// Nitrogen (mg/kg)
    pub nitrogen: f64,
    /// Phosphorous (mg/kg)
    pub phosphorous: f64,
    /// Potassium (mg/kg)
    pub potassium: f64,
    pub soil_type: String,
    pub crop_type: String,
}

/// Shortfall of each nutrient below the crop requirement. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeficitVector {
    pub n_deficit: f64,
    pub p_deficit: f64,
    pub k_deficit: f64,
}

impl DeficitVector {
    /// Deficits of `supplied` against `required`, clamped at zero.
    pub fn between(required: &NutrientProfile, supplied: &NutrientProfile) -> Self {
        Self {
            n_deficit: (required.n - supplied.n).max(0.0),
            p_deficit: (required.p - supplied.p).max(0.0),
            k_deficit: (required.k - supplied.k).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deficit_clamps_surplus_to_zero() {
        let required = NutrientProfile::new(25.0, 75.0, 50.0);
        let supplied = NutrientProfile::new(1000.0, 10.0, 50.0);
        let d = DeficitVector::between(&required, &supplied);
        assert_eq!(d.n_deficit, 0.0);
        assert_eq!(d.p_deficit, 65.0);
        assert_eq!(d.k_deficit, 0.0);
    }

    #[test]
    fn test_profile_serializes_with_npk_keys() {
        let json = serde_json::to_value(NutrientProfile::new(46.0, 0.0, 0.0)).unwrap();
        assert_eq!(json["N"], 46.0);
        assert_eq!(json["P"], 0.0);
        assert_eq!(json["K"], 0.0);
    }
}
