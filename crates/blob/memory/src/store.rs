use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use mediadrop_blob::{
    BlobContent, BlobError, BlobStore, BlobUpload, StoredBlob, ensure_kind, storage_filename,
};
use mediadrop_core::{BackendKind, StorageLocator};

/// In-memory blob store using `DashMap`. Suitable for development and testing.
///
/// By default it behaves like local storage and streams bytes back. Built
/// with [`MemoryBlobStore::remote`] it behaves like an object store: locators
/// carry a public URL and `open` answers with a redirect.
pub struct MemoryBlobStore {
    /// Storage filename -> bytes.
    objects: DashMap<String, Bytes>,
    public_base_url: Option<String>,
}

impl MemoryBlobStore {
    /// Create an empty, local-flavoured store.
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
            public_base_url: None,
        }
    }

    /// Create an empty, remote-flavoured store serving objects from
    /// `public_base_url`.
    pub fn remote(public_base_url: impl Into<String>) -> Self {
        let base = public_base_url.into();
        Self {
            objects: DashMap::new(),
            public_base_url: Some(base.trim_end_matches('/').to_owned()),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn key(&self, locator: &StorageLocator) -> Result<String, BlobError> {
        ensure_kind(self.backend(), locator)?;
        Ok(match locator {
            StorageLocator::Local { path } => path.clone(),
            StorageLocator::Remote { object_id, .. } => object_id.clone(),
        })
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> BackendKind {
        if self.public_base_url.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Local
        }
    }

    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let filename = storage_filename(&upload.original_name);
        let locator = match &self.public_base_url {
            Some(base) => StorageLocator::Remote {
                url: format!("{base}/{filename}"),
                object_id: filename.clone(),
            },
            None => StorageLocator::Local {
                path: filename.clone(),
            },
        };
        let size = upload.data.len() as u64;
        self.objects.insert(filename.clone(), upload.data);
        Ok(StoredBlob {
            filename,
            locator,
            size,
            content_type: upload.content_type,
        })
    }

    async fn open(&self, locator: &StorageLocator) -> Result<Option<BlobContent>, BlobError> {
        let key = self.key(locator)?;
        let Some(data) = self.objects.get(&key).map(|d| d.value().clone()) else {
            return Ok(None);
        };
        Ok(Some(match locator {
            StorageLocator::Remote { url, .. } => BlobContent::Redirect(url.clone()),
            StorageLocator::Local { .. } => BlobContent::Stream {
                size: data.len() as u64,
                reader: Box::pin(Cursor::new(data)),
            },
        }))
    }

    async fn delete(&self, locator: &StorageLocator) -> Result<bool, BlobError> {
        let key = self.key(locator)?;
        Ok(self.objects.remove(&key).is_some())
    }
}
