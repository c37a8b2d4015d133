use std::sync::Arc;

use mediadrop_blob::BlobStore;
use mediadrop_blob_local::LocalDiskBackend;
use mediadrop_blob_memory::MemoryBlobStore;
use mediadrop_blob_s3::ObjectStoreBackend;

use crate::config::StorageConfig;
use crate::error::ServerError;

/// Create the blob store selected by `[storage] backend`.
pub async fn create_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    let store: Arc<dyn BlobStore> = match config.backend.as_str() {
        "local" => Arc::new(LocalDiskBackend::new(&config.local_dir).await?),
        "memory" => Arc::new(MemoryBlobStore::new()),
        "s3" => Arc::new(ObjectStoreBackend::new(config.s3.clone()).await?),
        other => {
            return Err(ServerError::Config(format!(
                "unknown storage backend: {other} (expected local, s3 or memory)"
            )));
        }
    };
    Ok(store)
}
