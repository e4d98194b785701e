use crate::handlers::upload_files_handler;
use crate::middleware::track_uploads;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::path::Path;
use tower_http::services::ServeDir;

/// Upload endpoint. No body limit here: oversized parts have to reach
/// validation, and staging never buffers more than the size ceiling per part.
pub fn create_upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_files_handler))
        .layer(axum::middleware::from_fn_with_state(state, track_uploads))
        .layer(DefaultBodyLimit::disable())
}

/// Read-only access to stored files under their public path.
pub fn create_content_routes(public_path: &str, content_dir: &Path) -> Router<AppState> {
    Router::new().nest_service(public_path, ServeDir::new(content_dir))
}
