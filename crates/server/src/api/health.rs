use axum::Json;
use axum::extract::State;

use super::AppState;
use super::schemas::HealthResponse;

/// `GET /health` -- liveness plus the active backends.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and the storage and catalog backends in use.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        storage: state.blobs.backend(),
        catalog: state.catalog.name().to_owned(),
    })
}
