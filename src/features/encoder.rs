//! Label encoding of categorical columns.
//!
//! Encoders are fit once on the training corpus and reused unchanged at
//! inference. Codes follow the sorted order of the distinct values seen at
//! fit time, so the same corpus always yields the same codes.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use thiserror::Error;

use super::{EngineeredRecord, FeatureVector, CATEGORICAL_COLUMNS, NUM_FEATURES};

/// Errors raised while encoding features
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Unknown category '{value}' in column '{column}' (not seen during training)")]
    UnknownCategory { column: String, value: String },

    #[error("Encoding produced no feature rows")]
    EmptyBatch,
}

/// Stable value → integer code mapping for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    /// Distinct values, sorted; a value's code is its index
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit from the observed values of `column`.
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            column: column.to_string(),
            classes: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code of `value`, or `UnknownCategory` if it was not seen at fit time.
    pub fn transform(&self, value: &str) -> Result<usize, FeatureError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| FeatureError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// One fitted encoder per categorical column, in `CATEGORICAL_COLUMNS` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEncoders {
    encoders: Vec<LabelEncoder>,
}

impl FeatureEncoders {
    /// Fit every categorical column from `records`.
    pub fn fit(records: &[EngineeredRecord]) -> Self {
        let encoders = CATEGORICAL_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| LabelEncoder::fit(column, records.iter().map(|r| r.categorical_values()[i])))
            .collect();
        Self { encoders }
    }

    /// Full feature vector for one record.
    pub fn encode(&self, record: &EngineeredRecord) -> Result<FeatureVector, FeatureError> {
        let mut features = [0.0_f64; NUM_FEATURES];
        let numeric = record.numeric_features();
        features[..numeric.len()].copy_from_slice(&numeric);

        for (i, (encoder, value)) in self.encoders.iter().zip(record.categorical_values()).enumerate() {
            features[numeric.len() + i] = encoder.transform(value)? as f64;
        }
        Ok(features)
    }

    /// Encoder for a named column.
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.iter().find(|e| e.column() == column)
    }
}

/// Whether `encode` fits new encoders or reuses existing ones.
#[derive(Debug, Clone, Copy)]
pub enum EncodeMode<'a> {
    /// Build encoders from the records being encoded (training)
    Fit,
    /// Reuse encoders fit earlier (inference)
    Inference(&'a FeatureEncoders),
}

/// Encode a batch of records, returning the feature matrix and the encoders used.
///
/// In inference mode the returned encoders borrow the ones passed in.
pub fn encode<'a>(
    records: &[EngineeredRecord],
    mode: EncodeMode<'a>,
) -> Result<(Vec<FeatureVector>, Cow<'a, FeatureEncoders>), FeatureError> {
    let encoders = match mode {
        EncodeMode::Fit => Cow::Owned(FeatureEncoders::fit(records)),
        EncodeMode::Inference(existing) => Cow::Borrowed(existing),
    };
    let matrix = records
        .iter()
        .map(|r| encoders.encode(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((matrix, encoders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::engineer;
    use crate::types::SoilSample;

    fn record(soil: &str, crop: &str, n: f64) -> EngineeredRecord {
        engineer(&SoilSample {
            temperature: 28.0,
            humidity: 60.0,
            moisture: 45.0,
            nitrogen: n,
            phosphorous: 20.0,
            potassium: 15.0,
            soil_type: soil.into(),
            crop_type: crop.into(),
        })
    }

    #[test]
    fn test_codes_follow_sorted_order() {
        let enc = LabelEncoder::fit("soil_type", ["Sandy", "Black", "Red", "Black"]);
        assert_eq!(enc.classes(), &["Black", "Red", "Sandy"]);
        assert_eq!(enc.transform("Black"), Ok(0));
        assert_eq!(enc.transform("Sandy"), Ok(2));
    }

    #[test]
    fn test_unseen_value_is_an_error() {
        let enc = LabelEncoder::fit("soil_type", ["Sandy", "Black"]);
        assert_eq!(
            enc.transform("Other"),
            Err(FeatureError::UnknownCategory { column: "soil_type".into(), value: "Other".into() })
        );
    }

    #[test]
    fn test_fit_then_inference_reuses_codes() {
        let training = vec![record("Black", "Wheat", 10.0), record("Red", "Maize", 30.0), record("Sandy", "Rice", 50.0)];
        let (matrix, encoders) = encode(&training, EncodeMode::Fit).unwrap();
        assert_eq!(matrix.len(), 3);
        // soil_type code of "Red"
        assert_eq!(matrix[1][9], 1.0);
        // crop codes: Maize=0, Rice=1, Wheat=2
        assert_eq!(matrix[0][10], 2.0);

        let single = vec![record("Red", "Maize", 30.0)];
        let (inferred, reused) = encode(&single, EncodeMode::Inference(&encoders)).unwrap();
        assert_eq!(inferred[0], matrix[1]);
        assert!(matches!(reused, Cow::Borrowed(_)));
        assert_eq!(*reused, *encoders);
    }

    #[test]
    fn test_inference_rejects_unseen_soil() {
        let training = vec![record("Black", "Wheat", 10.0)];
        let (_, encoders) = encode(&training, EncodeMode::Fit).unwrap();
        let err = encode(&[record("Other", "Wheat", 10.0)], EncodeMode::Inference(&encoders)).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownCategory { ref column, .. } if column == "soil_type"));
    }

    #[test]
    fn test_inference_rejects_unseen_band() {
        // Only Low nitrogen seen during fit
        let training = vec![record("Black", "Wheat", 10.0)];
        let (_, encoders) = encode(&training, EncodeMode::Fit).unwrap();
        let err = encoders.encode(&record("Black", "Wheat", 80.0)).unwrap_err();
        assert_eq!(err, FeatureError::UnknownCategory { column: "n_level".into(), value: "High".into() });
        assert_eq!(encoders.get("n_level").map(|e| e.classes().len()), Some(1));
    }
}
