//! Conformance checks shared by every [`BlobStore`] backend.

use bytes::Bytes;
use mediadrop_core::{BackendKind, StorageLocator};
use tokio::io::AsyncReadExt;

use crate::{BlobContent, BlobError, BlobStore, BlobUpload};

fn upload(name: &str, data: &'static [u8]) -> BlobUpload {
    BlobUpload {
        original_name: name.to_owned(),
        content_type: "image/png".to_owned(),
        data: Bytes::from_static(data),
    }
}

fn foreign_locator(kind: BackendKind) -> StorageLocator {
    match kind {
        BackendKind::Local => StorageLocator::Remote {
            url: "https://elsewhere.example/x.png".into(),
            object_id: "x.png".into(),
        },
        BackendKind::Remote => StorageLocator::Local {
            path: "x.png".into(),
        },
    }
}

/// Run the full blob store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the backend fails an operation the suite expects to
/// succeed.
pub async fn run_blob_store_conformance_tests(store: &dyn BlobStore) -> Result<(), BlobError> {
    test_put_then_open(store).await?;
    test_distinct_filenames(store).await?;
    test_delete(store).await?;
    test_foreign_locator(store).await;
    Ok(())
}

async fn test_put_then_open(store: &dyn BlobStore) -> Result<(), BlobError> {
    let stored = store.put(upload("photo.PNG", b"\x89PNG fake bytes")).await?;
    assert_eq!(stored.size, 15);
    assert_eq!(stored.content_type, "image/png");
    assert!(
        stored.filename.ends_with(".png"),
        "filename should keep the lower-cased extension"
    );
    assert_eq!(stored.locator.kind(), store.backend());

    let content = store.open(&stored.locator).await?;
    match content {
        Some(BlobContent::Stream { mut reader, size }) => {
            assert_eq!(size, 15);
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await?;
            assert_eq!(buf, b"\x89PNG fake bytes");
        }
        Some(BlobContent::Redirect(url)) => {
            assert_eq!(url, stored.locator.reference());
        }
        None => panic!("stored object should be readable"),
    }
    Ok(())
}

async fn test_distinct_filenames(store: &dyn BlobStore) -> Result<(), BlobError> {
    let a = store.put(upload("same.jpg", b"a")).await?;
    let b = store.put(upload("same.jpg", b"b")).await?;
    assert_ne!(a.filename, b.filename, "uploads must never share a filename");
    assert_ne!(a.locator, b.locator);
    Ok(())
}

async fn test_delete(store: &dyn BlobStore) -> Result<(), BlobError> {
    let stored = store.put(upload("gone.mp4", b"video")).await?;
    assert!(store.delete(&stored.locator).await?, "first delete should report existing");
    if store.backend() == BackendKind::Local {
        assert!(store.open(&stored.locator).await?.is_none());
    }
    assert!(
        !store.delete(&stored.locator).await?,
        "deleting missing bytes should return false"
    );
    Ok(())
}

async fn test_foreign_locator(store: &dyn BlobStore) {
    let locator = foreign_locator(store.backend());
    let result = store.open(&locator).await;
    assert!(
        matches!(result, Err(BlobError::ForeignLocator { .. })),
        "foreign locator should be rejected"
    );
}
