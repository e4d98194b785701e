pub mod health_routes;
pub mod upload_routes;

pub use health_routes::*;
pub use upload_routes::*;

use crate::config::Settings;
use crate::middleware::{cors_layer, logging};
use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Full application router.
pub fn create_app(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .merge(create_health_routes())
        .merge(create_upload_routes(state.clone()))
        .merge(create_content_routes(
            &settings.upload.public_path,
            &settings.upload.content_dir,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&settings.cors.allowed_origin))
                .layer(axum::middleware::from_fn(logging::log_requests)),
        )
        .with_state(state)
}
