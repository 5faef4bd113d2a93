//! API endpoint handlers and shared state

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::AdvisorConfig;
use crate::recommender::Recommender;
use crate::types::{InputBounds, NutrientProfile, SoilSample};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub config: Arc<AdvisorConfig>,
    pub bounds: InputBounds,
    /// Held until a retrain's blocking task finishes so retrains never overlap
    retrain_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(recommender: Arc<Recommender>, config: AdvisorConfig) -> Self {
        Self {
            recommender,
            config: Arc::new(config),
            bounds: InputBounds::default(),
            retrain_lock: Arc::new(Mutex::new(())),
        }
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_trained: bool,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_trained: state.recommender.is_trained(),
    })
}

// ============================================================================
// Recommendation
// ============================================================================

/// POST /api/v1/recommend - Hybrid recommendation for one soil sample
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<SoilSample>, JsonRejection>,
) -> Response {
    let Json(sample) = match payload {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    let violations = state.bounds.check(&sample, state.recommender.rules().knowledge_base());
    if !violations.is_empty() {
        return ApiErrorResponse::invalid_input(violations);
    }

    ApiResponse::ok(state.recommender.recommend(&sample))
}

// ============================================================================
// Model
// ============================================================================

/// Optional overrides for a retrain request.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainRequest {
    pub samples: Option<usize>,
    pub seed: Option<u64>,
}

/// POST /api/v1/model/train - Retrain on a fresh synthetic corpus
///
/// Training runs on the blocking pool; the new bundle replaces the current
/// one only once it is complete. Concurrent requests are serialized.
pub async fn train_model(State(state): State<AppState>, body: Bytes) -> Response {
    let request: TrainRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TrainRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => return ApiErrorResponse::bad_request(format!("Invalid train request: {e}")),
        }
    };

    let mut training = state.config.training.clone();
    if let Some(samples) = request.samples {
        training.samples = samples;
    }
    if let Some(seed) = request.seed {
        training.seed = seed;
    }
    if let Err(e) = training.check_samples() {
        return ApiErrorResponse::bad_request(e);
    }

    // The guard moves into the blocking task so the lock outlives a dropped request
    let guard = Arc::clone(&state.retrain_lock).lock_owned().await;
    info!(samples = training.samples, seed = training.seed, "Retraining requested");

    let recommender = Arc::clone(&state.recommender);
    let forest = state.config.forest.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        recommender.train_synthetic(&training, &forest)
    })
    .await;

    match outcome {
        Ok(Ok(bundle)) => ApiResponse::ok(bundle.report().clone()),
        Ok(Err(e)) => {
            error!(error = %e, "Training failed");
            ApiErrorResponse::internal(format!("Training failed: {e}"))
        }
        Err(e) => {
            error!(error = %e, "Training task panicked");
            ApiErrorResponse::internal("Training task did not complete")
        }
    }
}

/// GET /api/v1/model - Report of the current model
pub async fn model_report(State(state): State<AppState>) -> Response {
    match state.recommender.model() {
        Some(bundle) => ApiResponse::ok(bundle.report().clone()),
        None => ApiErrorResponse::service_unavailable("No model trained yet; recommendations are rule-only"),
    }
}

// ============================================================================
// Knowledge Base
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NutrientEntry<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub npk: NutrientProfile,
}

fn entries(table: &[(String, NutrientProfile)]) -> Vec<NutrientEntry<'_>> {
    table
        .iter()
        .map(|(name, npk)| NutrientEntry { name, npk: *npk })
        .collect()
}

/// GET /api/v1/knowledge/crops - Crop requirement targets
pub async fn crops(State(state): State<AppState>) -> Response {
    ApiResponse::ok(entries(state.recommender.rules().knowledge_base().crop_requirements()))
}

/// GET /api/v1/knowledge/fertilizers - Fertilizer compositions
pub async fn fertilizers(State(state): State<AppState>) -> Response {
    ApiResponse::ok(entries(state.recommender.rules().knowledge_base().fertilizers()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForestConfig, TrainingConfig};

    #[tokio::test]
    async fn test_retrain_lock_outlives_dropped_request() {
        let config = AdvisorConfig {
            training: TrainingConfig { samples: 20_000, train_on_start: false, ..TrainingConfig::default() },
            forest: ForestConfig { n_trees: 100, ..ForestConfig::default() },
            ..AdvisorConfig::default()
        };
        let state = AppState::new(Arc::new(Recommender::default()), config);

        let request = tokio::spawn(train_model(State(state.clone()), Bytes::new()));
        while state.retrain_lock.try_lock().is_ok() {
            tokio::task::yield_now().await;
        }

        // Client goes away while the forest is still fitting
        request.abort();
        let _ = request.await;
        assert!(state.retrain_lock.try_lock().is_err());

        let _guard = state.retrain_lock.lock().await;
        assert!(state.recommender.is_trained());
    }
}
