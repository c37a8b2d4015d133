use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use mediadrop_blob::BlobStore;

use crate::error::CatalogError;
use crate::store::MediaCatalog;

/// Outcome of one expiry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// Records removed from the catalog.
    pub records: usize,
    /// Stored objects deleted along with them.
    pub blobs_deleted: usize,
    /// Objects that could not be deleted and are now orphaned.
    pub blob_failures: usize,
}

/// Remove records older than `ttl` as of `now` and release their bytes.
///
/// Byte deletion is best effort: failures are logged and counted but do not
/// fail the pass, since the records are already gone.
pub async fn reap_expired(
    catalog: &dyn MediaCatalog,
    blobs: &dyn BlobStore,
    ttl: chrono::Duration,
    now: DateTime<Utc>,
) -> Result<ReapReport, CatalogError> {
    let cutoff = now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let expired = catalog.remove_expired(cutoff).await?;

    let mut report = ReapReport {
        records: expired.len(),
        ..ReapReport::default()
    };
    for record in &expired {
        match blobs.delete(&record.storage).await {
            Ok(true) => report.blobs_deleted += 1,
            Ok(false) => debug!(id = %record.id, "expired media had no stored bytes"),
            Err(e) => {
                report.blob_failures += 1;
                warn!(
                    id = %record.id,
                    locator = %record.storage.reference(),
                    error = %e,
                    "failed to delete bytes of expired media, object orphaned"
                );
            }
        }
    }
    Ok(report)
}

/// Spawn a background task that removes expired media every `interval`.
///
/// Returns a `JoinHandle` that can be used to abort the task on shutdown.
pub fn spawn_reaper(
    catalog: Arc<dyn MediaCatalog>,
    blobs: Arc<dyn BlobStore>,
    ttl: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so nothing runs at startup.
        timer.tick().await;

        loop {
            timer.tick().await;
            match reap_expired(catalog.as_ref(), blobs.as_ref(), ttl, Utc::now()).await {
                Ok(report) if report.records == 0 => {}
                Ok(report) => info!(
                    removed = report.records,
                    blobs_deleted = report.blobs_deleted,
                    blob_failures = report.blob_failures,
                    "media reaper removed expired records"
                ),
                Err(e) => warn!(error = %e, "media reaper failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use mediadrop_blob::BlobUpload;
    use mediadrop_blob_memory::MemoryBlobStore;
    use mediadrop_core::{MediaRecord, PageRequest, StorageLocator, new_media_id};

    use super::*;
    use crate::store::MediaPage;

    #[derive(Default)]
    struct VecCatalog(Mutex<Vec<MediaRecord>>);

    #[async_trait]
    impl MediaCatalog for VecCatalog {
        fn name(&self) -> &'static str {
            "vec"
        }

        async fn insert(&self, record: MediaRecord) -> Result<(), CatalogError> {
            self.0.lock().unwrap().push(record);
            Ok(())
        }

        async fn get(&self, id: &str) -> Result<Option<MediaRecord>, CatalogError> {
            Ok(self.0.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn list(&self, _page: &PageRequest) -> Result<MediaPage, CatalogError> {
            let media = self.0.lock().unwrap().clone();
            let total = media.len() as u64;
            Ok(MediaPage { media, total })
        }

        async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
            let mut records = self.0.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() != before)
        }

        async fn remove_expired(
            &self,
            cutoff: DateTime<Utc>,
        ) -> Result<Vec<MediaRecord>, CatalogError> {
            let mut records = self.0.lock().unwrap();
            let (expired, kept): (Vec<_>, Vec<_>) = records.drain(..).partition(|r| r.uploaded_at <= cutoff);
            *records = kept;
            Ok(expired)
        }
    }

    fn record(storage: StorageLocator, uploaded_at: DateTime<Utc>) -> MediaRecord {
        MediaRecord {
            id: new_media_id(),
            filename: "f.png".into(),
            original_name: "f.png".into(),
            mimetype: "image/png".into(),
            size: 3,
            storage,
            uploader: "Guest".into(),
            message: String::new(),
            uploaded_at,
        }
    }

    async fn stored(blobs: &MemoryBlobStore) -> StorageLocator {
        blobs
            .put(BlobUpload {
                original_name: "f.png".into(),
                content_type: "image/png".into(),
                data: Bytes::from_static(b"png"),
            })
            .await
            .unwrap()
            .locator
    }

    #[tokio::test]
    async fn removes_expired_records_and_their_bytes() {
        let catalog = VecCatalog::default();
        let blobs = MemoryBlobStore::new();
        let now = Utc::now();
        let ttl = chrono::Duration::days(30);

        let old = record(stored(&blobs).await, now - chrono::Duration::days(31));
        let fresh = record(stored(&blobs).await, now - chrono::Duration::days(1));
        catalog.insert(old.clone()).await.unwrap();
        catalog.insert(fresh.clone()).await.unwrap();

        let report = reap_expired(&catalog, &blobs, ttl, now).await.unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(report.blobs_deleted, 1);
        assert!(catalog.get(&old.id).await.unwrap().is_none());
        assert!(catalog.get(&fresh.id).await.unwrap().is_some());
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn foreign_bytes_are_counted_as_failures() {
        let catalog = VecCatalog::default();
        let blobs = MemoryBlobStore::new();
        let now = Utc::now();
        let remote = StorageLocator::Remote {
            url: "https://cdn.example.com/x.png".into(),
            object_id: "x.png".into(),
        };
        catalog
            .insert(record(remote, now - chrono::Duration::days(40)))
            .await
            .unwrap();

        let report = reap_expired(&catalog, &blobs, chrono::Duration::days(30), now)
            .await
            .unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(report.blob_failures, 1);
    }

    #[tokio::test]
    async fn nothing_to_reap() {
        let catalog = VecCatalog::default();
        let blobs = MemoryBlobStore::new();
        let report = reap_expired(&catalog, &blobs, chrono::Duration::days(30), Utc::now())
            .await
            .unwrap();
        assert_eq!(report, ReapReport::default());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_reaper_runs_on_interval() {
        let catalog = Arc::new(VecCatalog::default());
        let blobs = Arc::new(MemoryBlobStore::new());
        let locator = stored(&blobs).await;
        let old = record(locator, Utc::now() - chrono::Duration::days(31));
        catalog.insert(old.clone()).await.unwrap();

        let handle = spawn_reaper(
            catalog.clone(),
            blobs.clone(),
            Duration::from_secs(30 * 24 * 3600),
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(catalog.get(&old.id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert!(catalog.get(&old.id).await.unwrap().is_none());
        assert!(blobs.is_empty());
        handle.abort();
    }
}
