use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediadrop_core::{MediaRecord, PageRequest};

use crate::error::CatalogError;

/// One page of media records plus the total record count.
#[derive(Debug, Clone, Default)]
pub struct MediaPage {
    /// Records on this page, newest first.
    pub media: Vec<MediaRecord>,
    /// Number of records in the whole catalog.
    pub total: u64,
}

/// Trait for media record storage backends.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Persist a new record.
    ///
    /// Fails with [`CatalogError::Duplicate`] when the id or storage filename
    /// is already taken.
    async fn insert(&self, record: MediaRecord) -> Result<(), CatalogError>;

    /// Fetch a record by id.
    async fn get(&self, id: &str) -> Result<Option<MediaRecord>, CatalogError>;

    /// List records ordered by upload time, newest first.
    async fn list(&self, page: &PageRequest) -> Result<MediaPage, CatalogError>;

    /// Delete a record by id. Returns `true` if it existed.
    async fn delete(&self, id: &str) -> Result<bool, CatalogError>;

    /// Remove every record uploaded at or before `cutoff` and return them,
    /// so their bytes can be released.
    async fn remove_expired(&self, cutoff: DateTime<Utc>)
    -> Result<Vec<MediaRecord>, CatalogError>;
}
