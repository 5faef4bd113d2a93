//! Feature Pipeline
//!
//! Bridges raw soil samples to the classifier. Two steps that must stay in
//! lockstep between training and inference:
//! - `engineer`: derived indicators (health index, stress flags, nutrient bands)
//! - `encode`: categorical columns to integer codes through fitted label encoders
//!
//! Feature vector layout (matches `FEATURE_NAMES`):
//! 9 numeric features followed by 5 encoded categorical columns.

mod encoder;

pub use encoder::{encode, EncodeMode, FeatureEncoders, FeatureError, LabelEncoder};

use serde::{Deserialize, Serialize};

use crate::types::SoilSample;

/// Number of classifier input features.
pub const NUM_FEATURES: usize = 14;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    // Numeric
    "temperature", "humidity", "moisture", "nitrogen", "potassium", "phosphorous",
    "soil_health_index", "temp_stress", "moisture_stress",
    // Encoded categorical
    "soil_type", "crop_type", "n_level", "p_level", "k_level",
];

/// Categorical columns in encoding order.
pub const CATEGORICAL_COLUMNS: [&str; 5] = ["soil_type", "crop_type", "n_level", "p_level", "k_level"];

/// One classifier input row.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Temperatures above this are heat stress (°C).
pub const TEMP_STRESS_HIGH: f64 = 35.0;
/// Temperatures below this are cold stress (°C).
pub const TEMP_STRESS_LOW: f64 = 20.0;
/// Moisture below this is drought stress (%).
pub const MOISTURE_STRESS_LOW: f64 = 30.0;
/// Moisture above this is waterlogging stress (%).
pub const MOISTURE_STRESS_HIGH: f64 = 70.0;

/// Upper edges of the Low and Medium bins, per nutrient. Bins are
/// right-inclusive: (0, low] is Low, (low, medium] is Medium, above is High.
pub const N_BIN_EDGES: (f64, f64) = (20.0, 40.0);
pub const P_BIN_EDGES: (f64, f64) = (15.0, 30.0);
pub const K_BIN_EDGES: (f64, f64) = (10.0, 20.0);

/// Categorical level of a nutrient reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutrientBand {
    Low,
    Medium,
    High,
}

impl NutrientBand {
    /// Band `value` against `(low, medium)` upper edges.
    ///
    /// Readings at or below zero band Low and readings above the last
    /// edge (100) band High, so every reading gets a band.
    pub fn from_value(value: f64, (low, medium): (f64, f64)) -> Self {
        if value <= low {
            Self::Low
        } else if value <= medium {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for NutrientBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A soil sample extended with derived indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredRecord {
    pub sample: SoilSample,
    /// Mean of N, P and K
    pub soil_health_index: f64,
    pub temp_stress: bool,
    pub moisture_stress: bool,
    pub n_level: NutrientBand,
    pub p_level: NutrientBand,
    pub k_level: NutrientBand,
}

impl EngineeredRecord {
    /// Categorical values in [`CATEGORICAL_COLUMNS`] order.
    pub fn categorical_values(&self) -> [&str; 5] {
        [
            self.sample.soil_type.as_str(),
            self.sample.crop_type.as_str(),
            self.n_level.as_str(),
            self.p_level.as_str(),
            self.k_level.as_str(),
        ]
    }

    /// The 9 numeric features, in vector order.
    pub fn numeric_features(&self) -> [f64; 9] {
        let s = &self.sample;
        [
            s.temperature,
            s.humidity,
            s.moisture,
            s.nitrogen,
            s.potassium,
            s.phosphorous,
            self.soil_health_index,
            f64::from(u8::from(self.temp_stress)),
            f64::from(u8::from(self.moisture_stress)),
        ]
    }
}

/// Derive the composite indicators for one sample.
pub fn engineer(sample: &SoilSample) -> EngineeredRecord {
    let soil_health_index = (sample.nitrogen + sample.phosphorous + sample.potassium) / 3.0;
    let temp_stress = sample.temperature > TEMP_STRESS_HIGH || sample.temperature < TEMP_STRESS_LOW;
    let moisture_stress = sample.moisture < MOISTURE_STRESS_LOW || sample.moisture > MOISTURE_STRESS_HIGH;

    EngineeredRecord {
        sample: sample.clone(),
        soil_health_index,
        temp_stress,
        moisture_stress,
        n_level: NutrientBand::from_value(sample.nitrogen, N_BIN_EDGES),
        p_level: NutrientBand::from_value(sample.phosphorous, P_BIN_EDGES),
        k_level: NutrientBand::from_value(sample.potassium, K_BIN_EDGES),
    }
}
