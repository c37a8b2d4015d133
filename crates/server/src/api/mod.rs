pub mod health;
pub mod media;
pub mod openapi;
pub mod schemas;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mediadrop_blob::BlobStore;
use mediadrop_catalog::MediaCatalog;

use crate::config::{MediadropConfig, UploadConfig};
use crate::error::ApiError;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where media bytes live.
    pub blobs: Arc<dyn BlobStore>,
    /// Where media records live.
    pub catalog: Arc<dyn MediaCatalog>,
    /// Upload limits and listing page cap.
    pub upload: Arc<UploadConfig>,
    /// Whether 500 responses carry the underlying error message.
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(blobs: Arc<dyn BlobStore>, catalog: Arc<dyn MediaCatalog>) -> Self {
        Self {
            blobs,
            catalog,
            upload: Arc::new(UploadConfig::default()),
            expose_errors: false,
        }
    }

    /// Build state from loaded configuration and constructed backends.
    pub fn from_config(
        config: &MediadropConfig,
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn MediaCatalog>,
    ) -> Self {
        Self {
            blobs,
            catalog,
            upload: Arc::new(config.upload.clone()),
            expose_errors: config.server.mode.exposes_errors(),
        }
    }

    #[must_use]
    pub fn with_upload_config(mut self, upload: UploadConfig) -> Self {
        self.upload = Arc::new(upload);
        self
    }

    #[must_use]
    pub fn with_expose_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    /// Log `cause` and build a 500 response honouring the deployment mode.
    pub fn internal_error(&self, message: &str, cause: &dyn std::fmt::Display) -> ApiError {
        ApiError::internal(message, cause, self.expose_errors)
    }
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let body_limit = state.upload.body_limit_bytes();

    Router::new()
        .route("/health", get(health::health))
        .route("/upload", post(upload::upload_media))
        .route("/media", get(media::list_media))
        .route(
            "/media/{id}",
            get(media::serve_media).delete(media::delete_media),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
