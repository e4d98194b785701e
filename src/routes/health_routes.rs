use crate::handlers::{get_api_health, get_root};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn create_health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_api_health))
        .route("/ready", get(|| async { "Ready" }))
        .route("/live", get(|| async { "Live" }))
}
