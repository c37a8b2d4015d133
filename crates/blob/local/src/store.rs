use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mediadrop_blob::{
    BlobContent, BlobError, BlobStore, BlobUpload, StoredBlob, ensure_kind, storage_filename,
};
use mediadrop_core::{BackendKind, StorageLocator};
use tracing::{debug, info, instrument, warn};

/// Stores media bytes as flat files under a managed root directory.
///
/// Locators carry the path as `<root>/<filename>`, but reads and deletes
/// only honour the file name component, so a tampered locator cannot reach
/// outside the root.
#[derive(Debug, Clone)]
pub struct LocalDiskBackend {
    root: PathBuf,
}

impl LocalDiskBackend {
    /// Create the backend, creating `root` if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            BlobError::Configuration(format!(
                "cannot create storage directory {}: {e}",
                root.display()
            ))
        })?;
        info!(path = %root.display(), "local media storage ready");
        Ok(Self { root })
    }

    fn resolve(&self, locator: &StorageLocator) -> Result<PathBuf, BlobError> {
        ensure_kind(BackendKind::Local, locator)?;
        let name = Path::new(locator.reference())
            .file_name()
            .ok_or_else(|| BlobError::InvalidLocator(locator.reference().to_owned()))?;
        Ok(self.root.join(name))
    }
}

/// Write `data` to `temp`, then move it to `dest`.
///
/// A failed write or rename removes `temp`, so a partially written file never
/// outlives the call.
async fn write_then_rename(temp: &Path, dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let result = async {
        tokio::fs::write(temp, data).await?;
        tokio::fs::rename(temp, dest).await
    }
    .await;

    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(temp).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %temp.display(), error = %e, "failed to remove partial upload");
    }
    result
}

#[async_trait]
impl BlobStore for LocalDiskBackend {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    #[instrument(skip(self, upload), fields(original_name = %upload.original_name, size = upload.data.len()))]
    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let filename = storage_filename(&upload.original_name);
        let path = self.root.join(&filename);
        let temp_path = self.root.join(format!(".{filename}.part"));

        write_then_rename(&temp_path, &path, &upload.data).await?;

        debug!(path = %path.display(), "stored media file");
        Ok(StoredBlob {
            filename,
            locator: StorageLocator::Local {
                path: path.to_string_lossy().into_owned(),
            },
            size: upload.data.len() as u64,
            content_type: upload.content_type,
        })
    }

    #[instrument(skip(self), fields(path = %locator.reference()))]
    async fn open(&self, locator: &StorageLocator) -> Result<Option<BlobContent>, BlobError> {
        let path = self.resolve(locator)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        Ok(Some(BlobContent::Stream {
            reader: Box::pin(file),
            size,
        }))
    }

    #[instrument(skip(self), fields(path = %locator.reference()))]
    async fn delete(&self, locator: &StorageLocator) -> Result<bool, BlobError> {
        let path = self.resolve(locator)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
