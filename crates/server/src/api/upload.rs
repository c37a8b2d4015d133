use axum::Json;
use axum::extract::State;
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use mediadrop_blob::StoredBlob;
use mediadrop_core::{MediaRecord, new_media_id};

use super::AppState;
use super::schemas::{ErrorResponse, UploadData, UploadResponse};
use crate::error::ApiError;
use crate::upload::{MediaUpload, discard_blobs};

/// `POST /upload` -- store up to ten image or video files.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Media",
    summary = "Upload media",
    description = "Accepts `multipart/form-data` with files under the `media` field and optional `uploader` and `message` text fields. Files are validated before any is stored.",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 400, description = "No files, unexpected field or message too long", body = ErrorResponse),
        (status = 413, description = "Too many files or file too large", body = ErrorResponse),
        (status = 415, description = "Not an image or video", body = ErrorResponse),
        (status = 500, description = "Storage or catalog failure", body = ErrorResponse),
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    upload: MediaUpload,
) -> Result<Json<UploadResponse>, ApiError> {
    if upload.files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".into()));
    }

    let uploader = MediaRecord::resolve_uploader(upload.uploader.as_deref());
    let uploaded_at = Utc::now();
    let records: Vec<MediaRecord> = upload
        .files
        .iter()
        .map(|file| MediaRecord {
            id: new_media_id(),
            filename: file.blob.filename.clone(),
            original_name: file.original_name.clone(),
            mimetype: file.blob.content_type.clone(),
            size: file.blob.size,
            storage: file.blob.locator.clone(),
            uploader: uploader.clone(),
            message: upload.message.clone(),
            uploaded_at,
        })
        .collect();

    let results = join_all(records.iter().map(|r| state.catalog.insert(r.clone()))).await;

    if let Some(err) = results.iter().find_map(|r| r.as_ref().err()) {
        let error = state.internal_error("Error uploading files", err);
        for (record, result) in records.iter().zip(&results) {
            if result.is_ok()
                && let Err(e) = state.catalog.delete(&record.id).await
            {
                warn!(id = %record.id, error = %e, "failed to roll back media record");
            }
        }
        let written: Vec<StoredBlob> = upload.files.into_iter().map(|f| f.blob).collect();
        discard_blobs(state.blobs.as_ref(), &written).await;
        return Err(error);
    }

    info!(count = records.len(), uploader = %uploader, "media uploaded");
    Ok(Json(UploadResponse {
        success: true,
        message: "Files uploaded successfully".into(),
        data: UploadData {
            files: records.iter().map(MediaRecord::summary).collect(),
        },
    }))
}
