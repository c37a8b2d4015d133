use serde::Deserialize;

use mediadrop_blob_s3::S3StorageConfig;

/// Blob storage backend configuration.
///
/// # Example
///
/// ```toml
/// [storage]
/// backend = "s3"
///
/// [storage.s3]
/// region = "eu-west-1"
/// bucket = "my-media"
/// public_url = "https://cdn.example.com"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend type: `"local"`, `"s3"` or `"memory"`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Root directory for the local backend.
    #[serde(default = "default_local_dir")]
    pub local_dir: String,
    /// Settings for the S3 backend.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            local_dir: default_local_dir(),
            s3: S3StorageConfig::default(),
        }
    }
}

fn default_storage_backend() -> String {
    "local".to_owned()
}

fn default_local_dir() -> String {
    "uploads".to_owned()
}
