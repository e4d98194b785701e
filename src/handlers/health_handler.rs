use axum::response::Json;
use chrono::Utc;
use serde_json::json;

pub async fn get_root() -> Json<serde_json::Value> {
    Json(json!({ "message": "All good" }))
}

pub async fn get_api_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "upload_service": "running"
        }
    }))
}
