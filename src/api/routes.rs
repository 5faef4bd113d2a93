//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

/// Build the v1 API router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/recommend", post(handlers::recommend))
        // Model
        .route("/model", get(handlers::model_report))
        .route("/model/train", post(handlers::train_model))
        // Knowledge base
        .route("/knowledge/crops", get(handlers::crops))
        .route("/knowledge/fertilizers", get(handlers::fertilizers))
        .with_state(state)
}

/// Routes served outside the versioned prefix.
pub fn root_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
