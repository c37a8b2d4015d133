//! Multipart upload extraction.
//!
//! [`MediaUpload`] validates every part of a `multipart/form-data` request
//! before any byte reaches storage, then writes the accepted files to the
//! active [`BlobStore`]. A failed write removes the files already written for
//! the same request.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use mediadrop_blob::{BlobStore, BlobUpload, StoredBlob};
use mediadrop_core::{MAX_MESSAGE_CHARS, MediaRecord, extension_of, is_accepted_mime};

use crate::api::AppState;
use crate::config::UploadConfig;
use crate::error::ApiError;

pub const MSG_NOT_MEDIA: &str = "Only image and video files are allowed!";

/// A file written to storage during extraction.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Filename supplied by the client.
    pub original_name: String,
    /// What the backend stored.
    pub blob: StoredBlob,
}

/// A validated, stored multipart upload.
///
/// Every file part is buffered in memory until the whole form has been
/// validated, so nothing reaches storage for a request that is later
/// rejected. Peak memory per request is therefore up to
/// `max_files * max_file_size` (100 MiB with the defaults). Size the limits
/// with the expected number of concurrent uploads in mind.
#[derive(Debug, Clone, Default)]
pub struct MediaUpload {
    /// Stored files, in request order. May be empty.
    pub files: Vec<StoredFile>,
    /// Raw `uploader` text field, if sent.
    pub uploader: Option<String>,
    /// `message` text field, empty if not sent.
    pub message: String,
}

impl FromRequest<AppState> for MediaUpload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let parsed = read_parts(&mut multipart, &state.upload).await?;
        let files = store_parts(state, parsed.files).await?;

        Ok(Self {
            files,
            uploader: parsed.uploader,
            message: parsed.message,
        })
    }
}

/// Everything read from the request, validated but not yet stored.
#[derive(Debug, Default)]
struct ParsedUpload {
    files: Vec<BlobUpload>,
    uploader: Option<String>,
    message: String,
}

async fn read_parts(
    multipart: &mut Multipart,
    limits: &UploadConfig,
) -> Result<ParsedUpload, ApiError> {
    let mut parsed = ParsedUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();

        let Some(original_name) = field.file_name().map(str::to_owned) else {
            match name.as_str() {
                "uploader" => parsed.uploader = Some(field.text().await.map_err(multipart_error)?),
                "message" => parsed.message = field.text().await.map_err(multipart_error)?,
                _ => debug!(field = %name, "ignoring unknown form field"),
            }
            continue;
        };

        if name != limits.field_name {
            return Err(ApiError::BadRequest(format!("Unexpected field: {name}")));
        }
        if parsed.files.len() >= limits.max_files {
            return Err(ApiError::PayloadTooLarge(format!(
                "Too many files, at most {} allowed",
                limits.max_files
            )));
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !is_accepted_mime(&content_type) {
            return Err(ApiError::UnsupportedMediaType(MSG_NOT_MEDIA.to_owned()));
        }
        if !limits.allows_extension(extension_of(&original_name).as_deref()) {
            return Err(ApiError::UnsupportedMediaType(format!(
                "File type not allowed: {original_name}"
            )));
        }

        let data = read_limited(field, limits.max_file_size_bytes()).await?;
        parsed.files.push(BlobUpload {
            original_name,
            content_type,
            data,
        });
    }

    if let Err(e) = MediaRecord::validate_message(&parsed.message) {
        debug!(chars = e.chars, "upload message too long");
        return Err(ApiError::BadRequest(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    Ok(parsed)
}

/// Read a file part chunk by chunk, giving up as soon as it exceeds `limit`.
async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<Bytes, ApiError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large, limit is {limit} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

async fn store_parts(state: &AppState, uploads: Vec<BlobUpload>) -> Result<Vec<StoredFile>, ApiError> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let original_name = upload.original_name.clone();
        match state.blobs.put(upload).await {
            Ok(blob) => stored.push(StoredFile { original_name, blob }),
            Err(e) => {
                let written: Vec<StoredBlob> = stored.into_iter().map(|f| f.blob).collect();
                discard_blobs(state.blobs.as_ref(), &written).await;
                return Err(state.internal_error("Error uploading files", &e));
            }
        }
    }
    Ok(stored)
}

/// Best-effort removal of stored blobs; failures leave orphans and are logged.
pub async fn discard_blobs(blobs: &dyn BlobStore, written: &[StoredBlob]) {
    for blob in written {
        if let Err(e) = blobs.delete(&blob.locator).await {
            warn!(
                filename = %blob.filename,
                locator = %blob.locator.reference(),
                error = %e,
                "failed to remove stored upload, object orphaned"
            );
        }
    }
}
