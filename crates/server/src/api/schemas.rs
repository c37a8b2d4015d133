use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use mediadrop_core::{BackendKind, MediaRecord, MediaSummary, Pagination};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    pub message: String,
    /// Underlying error detail on 500 responses, or `"Internal server error"`
    /// outside development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadData {
    /// One summary per stored file, in request order.
    pub files: Vec<MediaSummary>,
}

/// Query parameters for `GET /media`.
///
/// Values are parsed leniently: missing, zero or non-numeric values fall back
/// to the defaults (page 1, limit 20).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMediaParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size, capped at the configured maximum.
    pub limit: Option<String>,
}

/// Body of `GET /media`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMediaResponse {
    pub success: bool,
    pub data: ListMediaData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMediaData {
    /// Records on this page, newest first.
    pub media: Vec<MediaRecord>,
    pub pagination: Pagination,
}

/// Body of a successful delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is serving requests.
    pub status: String,
    /// Kind of blob storage in use.
    pub storage: BackendKind,
    /// Name of the catalog backend.
    pub catalog: String,
}
