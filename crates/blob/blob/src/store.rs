use async_trait::async_trait;
use mediadrop_core::{BackendKind, StorageLocator};

use crate::error::BlobError;
use crate::types::{BlobContent, BlobUpload, StoredBlob};

/// Pluggable storage backend for uploaded media bytes.
///
/// A running server holds exactly one backend. Every locator a backend
/// produces must be accepted by the same backend's `open` and `delete`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// The kind of locator this backend produces.
    fn backend(&self) -> BackendKind;

    /// Store the bytes of one validated upload.
    ///
    /// The backend assigns a storage filename that never collides with an
    /// existing object, even when two uploads share an original name.
    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError>;

    /// Open previously stored bytes for serving.
    ///
    /// Local backends return `None` when the object no longer exists. Remote
    /// backends may answer with a redirect without checking, leaving a
    /// missing object for the object store to report.
    async fn open(&self, locator: &StorageLocator) -> Result<Option<BlobContent>, BlobError>;

    /// Remove stored bytes. Returns `true` if the object existed.
    async fn delete(&self, locator: &StorageLocator) -> Result<bool, BlobError>;
}

/// Reject locators that belong to another kind of backend.
pub fn ensure_kind(expected: BackendKind, locator: &StorageLocator) -> Result<(), BlobError> {
    let found = locator.kind();
    if found == expected {
        Ok(())
    } else {
        Err(BlobError::ForeignLocator { expected, found })
    }
}
