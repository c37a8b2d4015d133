//! Conformance checks shared by every [`MediaCatalog`] backend.

use chrono::{DateTime, Duration, Utc};
use mediadrop_core::{MediaRecord, PageRequest, StorageLocator, new_media_id};

use crate::error::CatalogError;
use crate::store::MediaCatalog;

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

fn make_record(name: &str, uploaded_at: DateTime<Utc>) -> MediaRecord {
    let id = new_media_id();
    MediaRecord {
        filename: format!("{id}.png"),
        id,
        original_name: name.to_owned(),
        mimetype: "image/png".to_owned(),
        size: 1024,
        storage: StorageLocator::Local {
            path: format!("uploads/{name}"),
        },
        uploader: "Guest".to_owned(),
        message: "conformance".to_owned(),
        uploaded_at,
    }
}

/// Run the full catalog conformance test suite.
///
/// Call this from your backend's test module with a fresh, empty catalog.
///
/// # Errors
///
/// Returns an error if the backend fails an operation the suite expects to
/// succeed.
pub async fn run_catalog_conformance_tests(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    test_get_missing(catalog).await?;
    test_insert_and_get(catalog).await?;
    test_duplicate_id(catalog).await?;
    test_list_newest_first(catalog).await?;
    test_delete(catalog).await?;
    test_remove_expired(catalog).await?;
    Ok(())
}

async fn test_get_missing(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let found = catalog.get("does-not-exist").await?;
    assert!(found.is_none(), "get on missing id should return None");
    Ok(())
}

async fn test_insert_and_get(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let record = make_record("insert.png", base_time());
    catalog.insert(record.clone()).await?;
    let found = catalog.get(&record.id).await?;
    assert_eq!(found.as_ref(), Some(&record));
    catalog.delete(&record.id).await?;
    Ok(())
}

async fn test_duplicate_id(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let record = make_record("dup.png", base_time());
    catalog.insert(record.clone()).await?;
    let again = catalog.insert(record.clone()).await;
    assert!(
        matches!(again, Err(CatalogError::Duplicate(_))),
        "second insert with the same id should be a duplicate"
    );
    catalog.delete(&record.id).await?;
    Ok(())
}

async fn test_list_newest_first(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let records: Vec<MediaRecord> = (0..5)
        .map(|i| make_record(&format!("list-{i}.png"), base_time() + Duration::minutes(i)))
        .collect();
    for record in &records {
        catalog.insert(record.clone()).await?;
    }

    let first = catalog.list(&PageRequest::new(1, 2)).await?;
    assert_eq!(first.total, 5);
    let names: Vec<_> = first.media.iter().map(|r| r.original_name.as_str()).collect();
    assert_eq!(names, ["list-4.png", "list-3.png"]);

    let last = catalog.list(&PageRequest::new(3, 2)).await?;
    assert_eq!(last.total, 5);
    assert_eq!(last.media.len(), 1);
    assert_eq!(last.media[0].original_name, "list-0.png");

    let beyond = catalog.list(&PageRequest::new(9, 2)).await?;
    assert!(beyond.media.is_empty());
    assert_eq!(beyond.total, 5);

    for record in &records {
        catalog.delete(&record.id).await?;
    }
    Ok(())
}

async fn test_delete(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let record = make_record("delete.png", base_time());
    catalog.insert(record.clone()).await?;
    assert!(catalog.delete(&record.id).await?, "first delete should return true");
    assert!(catalog.get(&record.id).await?.is_none());
    assert!(
        !catalog.delete(&record.id).await?,
        "second delete should return false"
    );
    Ok(())
}

async fn test_remove_expired(catalog: &dyn MediaCatalog) -> Result<(), CatalogError> {
    let cutoff = base_time();
    let old = make_record("old.png", cutoff - Duration::days(1));
    let edge = make_record("edge.png", cutoff);
    let fresh = make_record("fresh.png", cutoff + Duration::seconds(1));
    for record in [&old, &edge, &fresh] {
        catalog.insert(record.clone()).await?;
    }

    let mut removed: Vec<String> = catalog
        .remove_expired(cutoff)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    removed.sort();
    let mut expected = vec![old.id.clone(), edge.id.clone()];
    expected.sort();
    assert_eq!(removed, expected);

    assert!(catalog.get(&old.id).await?.is_none());
    assert!(catalog.get(&fresh.id).await?.is_some());
    assert!(catalog.remove_expired(cutoff).await?.is_empty());

    catalog.delete(&fresh.id).await?;
    Ok(())
}
