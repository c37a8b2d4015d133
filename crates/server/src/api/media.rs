use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use mediadrop_blob::BlobContent;
use mediadrop_core::{PageRequest, Pagination};

use super::AppState;
use super::schemas::{
    DeleteMediaResponse, ErrorResponse, ListMediaData, ListMediaParams, ListMediaResponse,
};
use crate::error::ApiError;

const MSG_NOT_FOUND: &str = "Media not found";

/// `GET /media` -- list media records, newest first.
#[utoipa::path(
    get,
    path = "/media",
    tag = "Media",
    summary = "List media",
    params(ListMediaParams),
    responses(
        (status = 200, description = "One page of media records", body = ListMediaResponse),
        (status = 500, description = "Catalog failure", body = ErrorResponse),
    )
)]
pub async fn list_media(
    State(state): State<AppState>,
    Query(params): Query<ListMediaParams>,
) -> Result<Json<ListMediaResponse>, ApiError> {
    let request = PageRequest::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.upload.max_page_size,
    );

    let page = state
        .catalog
        .list(&request)
        .await
        .map_err(|e| state.internal_error("Error fetching media", &e))?;

    Ok(Json(ListMediaResponse {
        success: true,
        data: ListMediaData {
            media: page.media,
            pagination: Pagination::new(request, page.total),
        },
    }))
}

/// `GET /media/{id}` -- serve the stored bytes.
///
/// Remote objects answer with a `302` redirect to their public URL; local
/// files are streamed.
#[utoipa::path(
    get,
    path = "/media/{id}",
    tag = "Media",
    summary = "Serve media",
    params(("id" = String, Path, description = "Media record ID")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 302, description = "Redirect to the stored object's public URL"),
        (status = 404, description = "Unknown id or missing bytes", body = ErrorResponse),
        (status = 500, description = "Storage or catalog failure", body = ErrorResponse),
    )
)]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state
        .catalog
        .get(&id)
        .await
        .map_err(|e| state.internal_error("Error serving media", &e))?
        .ok_or_else(|| ApiError::NotFound(MSG_NOT_FOUND.into()))?;

    let content = state
        .blobs
        .open(&record.storage)
        .await
        .map_err(|e| state.internal_error("Error serving media", &e))?;

    match content {
        None => {
            warn!(id = %id, locator = %record.storage.reference(), "media record has no stored bytes");
            Err(ApiError::NotFound(MSG_NOT_FOUND.into()))
        }
        Some(BlobContent::Redirect(url)) => {
            let location = HeaderValue::from_str(&url)
                .map_err(|e| state.internal_error("Error serving media", &e))?;
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        Some(BlobContent::Stream { reader, size }) => {
            let content_type = HeaderValue::from_str(&record.mimetype)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
            let body = Body::from_stream(ReaderStream::new(reader));
            Ok((
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, HeaderValue::from(size)),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// `DELETE /media/{id}` -- remove a record and its bytes.
#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "Media",
    summary = "Delete media",
    description = "Deletes the media record, then its stored bytes. A failure to delete the bytes is logged and does not fail the request.",
    params(("id" = String, Path, description = "Media record ID")),
    responses(
        (status = 200, description = "Media deleted", body = DeleteMediaResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 500, description = "Catalog failure", body = ErrorResponse),
    )
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteMediaResponse>, ApiError> {
    let record = state
        .catalog
        .get(&id)
        .await
        .map_err(|e| state.internal_error("Error deleting media", &e))?
        .ok_or_else(|| ApiError::NotFound(MSG_NOT_FOUND.into()))?;

    let removed = state
        .catalog
        .delete(&id)
        .await
        .map_err(|e| state.internal_error("Error deleting media", &e))?;
    if !removed {
        return Err(ApiError::NotFound(MSG_NOT_FOUND.into()));
    }

    if let Err(e) = state.blobs.delete(&record.storage).await {
        warn!(
            id = %id,
            locator = %record.storage.reference(),
            error = %e,
            "media record deleted but bytes could not be removed, object orphaned"
        );
    }

    info!(id = %id, filename = %record.filename, "media deleted");
    Ok(Json(DeleteMediaResponse {
        success: true,
        message: "Media deleted successfully".into(),
    }))
}
