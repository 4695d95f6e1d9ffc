use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::api::schemas::UploadMediaResponse;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/medias - upload an image and create an orphaned attachment.
///
/// The attachment row commits before the file hits disk; a failed write
/// leaves a row pointing at a missing file and surfaces as a 500.
pub async fn upload_media(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadMediaResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Invalid multipart body: {}", err)))?
        .ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    let original_name = field
        .file_name()
        .ok_or_else(|| ApiError::bad_request("Missing file name"))?
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::bad_request(format!("Failed to read file: {}", err)))?;

    let attachment = state.storage.create_attachment(&original_name).await?;

    // file_name is always set right after create_attachment
    let file_name = attachment.file_name.as_deref().unwrap_or_default();
    let path = state.images_dir().join(file_name);
    tokio::fs::write(&path, &bytes).await.map_err(|err| {
        tracing::error!("Failed to write {}: {}", path.display(), err);
        ApiError::internal_server_error("Failed to store uploaded file")
    })?;

    Ok(Json(UploadMediaResponse {
        result: true,
        media_id: attachment.id,
    }))
}
