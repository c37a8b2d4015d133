#![allow(clippy::needless_for_each)]

use mediadrop_core::{BackendKind, MediaRecord, MediaSummary, Pagination, StorageLocator};

use super::schemas::{
    DeleteMediaResponse, ErrorResponse, HealthResponse, ListMediaData, ListMediaResponse,
    UploadData, UploadResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "mediadrop API",
        version = "0.1.0",
        description = "HTTP API for uploading, listing, serving and deleting image and video files.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Media", description = "Media upload, listing, retrieval and deletion")
    ),
    paths(
        super::health::health,
        super::upload::upload_media,
        super::media::list_media,
        super::media::serve_media,
        super::media::delete_media,
    ),
    components(schemas(
        MediaRecord, MediaSummary, StorageLocator, BackendKind, Pagination,
        ErrorResponse, HealthResponse,
        UploadResponse, UploadData,
        ListMediaResponse, ListMediaData,
        DeleteMediaResponse,
    ))
)]
pub struct ApiDoc;
