use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use mediadrop_catalog::{CatalogError, MediaCatalog, MediaPage};
use mediadrop_core::{MediaRecord, PageRequest};

/// In-memory media catalog using `DashMap`. Suitable for development and testing.
///
/// Records are keyed by id, with a secondary index from storage filename to
/// id that enforces filename uniqueness.
pub struct MemoryMediaCatalog {
    /// Primary store: record id -> `MediaRecord`.
    records: DashMap<String, MediaRecord>,
    /// Secondary index: storage filename -> record id.
    filenames: DashMap<String, String>,
}

impl MemoryMediaCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            filenames: DashMap::new(),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn remove(&self, id: &str) -> Option<MediaRecord> {
        let (_, record) = self.records.remove(id)?;
        self.filenames
            .remove_if(&record.filename, |_, owner| owner == id);
        Some(record)
    }
}

impl Default for MemoryMediaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaCatalog for MemoryMediaCatalog {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: MediaRecord) -> Result<(), CatalogError> {
        match self.filenames.entry(record.filename.clone()) {
            Entry::Occupied(_) => {
                return Err(CatalogError::Duplicate(format!(
                    "filename {}",
                    record.filename
                )));
            }
            Entry::Vacant(slot) => {
                if self.records.contains_key(&record.id) {
                    return Err(CatalogError::Duplicate(format!("id {}", record.id)));
                }
                slot.insert(record.id.clone());
            }
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<MediaRecord>, CatalogError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn list(&self, page: &PageRequest) -> Result<MediaPage, CatalogError> {
        let mut all: Vec<MediaRecord> = self.records.iter().map(|r| r.value().clone()).collect();

        // Newest first; id breaks ties so paging is stable.
        all.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = all.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let media = all
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .collect();

        Ok(MediaPage { media, total })
    }

    async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        Ok(self.remove(id).is_some())
    }

    async fn remove_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaRecord>, CatalogError> {
        // Collect ids first; the map cannot be mutated while iterating.
        let expired_ids: Vec<String> = self
            .records
            .iter()
            .filter(|entry| entry.value().uploaded_at <= cutoff)
            .map(|entry| entry.key().clone())
            .collect();

        Ok(expired_ids
            .iter()
            .filter_map(|id| self.remove(id))
            .collect())
    }
}
