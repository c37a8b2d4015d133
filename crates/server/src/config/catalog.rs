use serde::Deserialize;

use mediadrop_core::DEFAULT_RECORD_TTL_SECONDS;

/// Media catalog backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Backend type: `"memory"` or `"postgres"`.
    #[serde(default = "default_catalog_backend")]
    pub backend: String,
    /// Connection URL for database backends.
    pub url: Option<String>,
    /// Table name prefix.
    #[serde(default = "default_catalog_prefix")]
    pub prefix: String,
    /// Maximum pooled database connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Age in seconds after which media expires.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// How often the expiry reaper runs, in seconds. `0` disables it.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: default_catalog_backend(),
            url: None,
            prefix: default_catalog_prefix(),
            max_connections: default_max_connections(),
            ttl_seconds: default_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_catalog_backend() -> String {
    "memory".to_owned()
}

fn default_catalog_prefix() -> String {
    "mediadrop_".to_owned()
}

fn default_max_connections() -> u32 {
    10
}

fn default_ttl() -> u64 {
    DEFAULT_RECORD_TTL_SECONDS
}

fn default_cleanup_interval() -> u64 {
    3600
}
