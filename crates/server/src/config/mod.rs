mod catalog;
mod server;
mod storage;
mod telemetry;
mod upload;


pub use catalog::*;
pub use server::*;
pub use storage::*;
pub use telemetry::*;
pub use upload::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Overrides `upload.max_file_size_mb`.
pub const ENV_UPLOAD_LIMIT_MB: &str = "MEDIADROP_UPLOAD_LIMIT_MB";
/// Overrides `server.mode` (`development` exposes error details).
pub const ENV_MODE: &str = "MEDIADROP_ENV";
/// Overrides `catalog.url`.
pub const ENV_CATALOG_URL: &str = "MEDIADROP_CATALOG_URL";

/// Top-level configuration for the mediadrop server, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediadropConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload validation limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Where media bytes are stored.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Where media records are stored.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl MediadropConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Whether records live only in memory while their bytes persist, so a
    /// restart leaves stored files that nothing lists or expires.
    pub fn records_lost_on_restart(&self) -> bool {
        self.catalog.backend == "memory" && self.storage.backend != "memory"
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_UPLOAD_LIMIT_MB) {
            self.upload.max_file_size_mb = raw.trim().parse().map_err(|_| {
                ServerError::Config(format!("{ENV_UPLOAD_LIMIT_MB} must be a whole number, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_MODE) {
            self.server.mode = ServerMode::from_env_value(&raw);
        }
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|u| !u.trim().is_empty()) {
            self.catalog.url = Some(url);
        }
        Ok(())
    }
}
