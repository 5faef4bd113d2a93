//! REST API module using Axum
//!
//! - `GET  /health`
//! - `POST /api/v1/recommend`
//! - `GET  /api/v1/model`, `POST /api/v1/model/train`
//! - `GET  /api/v1/knowledge/crops`, `GET /api/v1/knowledge/fertilizers`
//!
//! All responses use the envelope in [`envelope`].

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::AppState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Comma-separated list of origins allowed cross-origin access.
pub const CORS_ORIGINS_ENV_VAR: &str = "ADVISOR_CORS_ORIGINS";

/// CORS layer that is same-origin only unless `ADVISOR_CORS_ORIGINS` is set.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ORIGINS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::root_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
