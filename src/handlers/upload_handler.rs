use crate::error::UploadError;
use crate::models::{UploadPolicy, UploadResponse, FILES_FIELD};
use crate::services::StagedFile;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

/// `POST /api/upload`
///
/// Stages every `files` part, validates the whole batch and only then writes it.
pub async fn upload_files_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;
    let policy = state.upload_service.policy();

    let staged = stage_files(&mut multipart, policy).await?;
    tracing::debug!(count = staged.len(), "staged upload batch");

    let files = state.upload_service.accept_batch(staged).await?;
    Ok(Json(UploadResponse { files }))
}

/// Buffer the `files` parts of a request. Other fields are skipped.
/// Reading stops as soon as the batch is known to be over the count limit.
async fn stage_files(
    multipart: &mut Multipart,
    policy: UploadPolicy,
) -> Result<Vec<StagedFile>, UploadError> {
    let mut staged: Vec<StagedFile> = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        if staged.len() == policy.max_files {
            return Err(UploadError::TooManyFiles {
                max: policy.max_files,
            });
        }

        let mut file = StagedFile::new(
            field.file_name().unwrap_or_default(),
            field.content_type().map(|s| s.to_string()),
        );
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            file.append(&chunk, policy.max_file_size);
        }
        staged.push(file);
    }

    Ok(staged)
}
