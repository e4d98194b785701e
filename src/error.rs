use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Request-terminating upload failures.
///
/// Validation variants carry the message shown to the client. Everything else
/// is reported as a generic 500 and only logged in detail.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No files provided.")]
    NoFiles,
    #[error("You can upload up to {max} files at once.")]
    TooManyFiles { max: usize },
    #[error("Only PDF files are allowed.")]
    NotPdf { name: String },
    #[error("File \"{name}\" exceeds {limit_mb} MB.")]
    TooLarge { name: String, limit_mb: u64 },
    #[error("Server is shutting down.")]
    ShuttingDown,
    #[error("malformed multipart request: {0}")]
    Multipart(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub const GENERIC_UPLOAD_FAILURE: &str = "Failed to upload files.";

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::NoFiles
            | UploadError::TooManyFiles { .. }
            | UploadError::NotPdf { .. }
            | UploadError::TooLarge { .. } => StatusCode::BAD_REQUEST,
            UploadError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            UploadError::Multipart(_) | UploadError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "upload failed");
            GENERIC_UPLOAD_FAILURE.to_string()
        } else {
            match &self {
                UploadError::NotPdf { name } | UploadError::TooLarge { name, .. } => {
                    tracing::warn!(name = %name, reason = %self, "rejected upload batch");
                }
                _ => tracing::warn!(reason = %self, "rejected upload request"),
            }
            self.to_string()
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
