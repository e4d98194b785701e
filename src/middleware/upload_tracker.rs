use axum::{body::Body, extract::State, http::Request, middleware::Next, response::IntoResponse};

use crate::error::UploadError;
use crate::state::AppState;

/// Middleware function to track in-flight uploads
pub async fn track_uploads(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    // Refuse new uploads once shutdown has started
    let Some(_guard) = state.shutdown_coordinator.begin_upload() else {
        return UploadError::ShuttingDown.into_response();
    };

    next.run(req).await.into_response()
}
