use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use tracing::{debug, info, warn};

/// Middleware function to log all incoming requests
pub async fn log_requests(req: Request<Body>, next: Next) -> impl IntoResponse {
    let method = req.method().clone();
    let uri = req.uri().clone();

    info!("Incoming request: {} {}", method, uri);

    // Skip logging sensitive headers like authorization
    for (name, value) in req.headers().iter() {
        if name != "authorization" && name != "cookie" {
            match value.to_str() {
                Ok(value_str) => {
                    debug!("Header: {}: {}", name, value_str);
                }
                Err(_) => {
                    debug!("Header: {}: (binary data)", name);
                }
            }
        }
    }

    let response = next.run(req).await;

    let status = response.status();
    info!("Response status for {} {}: {}", method, uri, status);

    if status.is_server_error() {
        tracing::error!("Error response for {} {}: {}", method, uri, status);
    } else if status.is_client_error() {
        warn!("Rejected request {} {}: {}", method, uri, status);
    }

    response
}
