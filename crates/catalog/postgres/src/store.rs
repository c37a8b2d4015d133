use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, instrument};

use mediadrop_catalog::{CatalogError, MediaCatalog, MediaPage};
use mediadrop_core::{MediaRecord, PageRequest, StorageLocator};

use crate::config::PostgresCatalogConfig;
use crate::migrations;

/// Postgres-backed media catalog using `sqlx`.
pub struct PostgresMediaCatalog {
    pool: PgPool,
    table: String,
}

impl PostgresMediaCatalog {
    /// Connect to Postgres and run migrations.
    pub async fn new(config: &PostgresCatalogConfig) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Self::from_pool(pool, &config.prefix).await
    }

    /// Create from an existing pool, running migrations.
    pub async fn from_pool(pool: PgPool, prefix: &str) -> Result<Self, CatalogError> {
        migrations::run_migrations(&pool, prefix)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(Self {
            pool,
            table: migrations::media_table(prefix),
        })
    }
}

fn storage_error(e: sqlx::Error) -> CatalogError {
    CatalogError::Storage(e.to_string())
}

#[async_trait]
impl MediaCatalog for PostgresMediaCatalog {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert(&self, record: MediaRecord) -> Result<(), CatalogError> {
        let sql = format!(
            r"
            INSERT INTO {} (
                id, filename, original_name, mimetype, size,
                storage, uploader, message, uploaded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
            self.table
        );

        let storage = serde_json::to_value(&record.storage)
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;
        let size = i64::try_from(record.size)
            .map_err(|_| CatalogError::Serialization(format!("size {} out of range", record.size)))?;

        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.filename)
            .bind(&record.original_name)
            .bind(&record.mimetype)
            .bind(size)
            .bind(storage)
            .bind(&record.uploader)
            .bind(&record.message)
            .bind(record.uploaded_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                    CatalogError::Duplicate(record.id.clone())
                } else {
                    storage_error(e)
                }
            })?;

        debug!("media record inserted");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<MediaRecord>, CatalogError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table);

        let row = sqlx::query_as::<_, MediaRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, page: &PageRequest) -> Result<MediaPage, CatalogError> {
        let count_sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let sql = format!(
            "SELECT * FROM {} ORDER BY uploaded_at DESC, id DESC LIMIT $1 OFFSET $2",
            self.table
        );
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, MediaRow>(&sql)
            .bind(i64::from(page.limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let media = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MediaPage {
            media,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn remove_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaRecord>, CatalogError> {
        let sql = format!(
            "DELETE FROM {} WHERE uploaded_at <= $1 RETURNING *",
            self.table
        );
        let rows = sqlx::query_as::<_, MediaRow>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

/// Internal row type for sqlx deserialization.
#[derive(sqlx::FromRow)]
struct MediaRow {
    id: String,
    filename: String,
    original_name: String,
    mimetype: String,
    size: i64,
    storage: serde_json::Value,
    uploader: String,
    message: String,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for MediaRecord {
    type Error = CatalogError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        let storage: StorageLocator = serde_json::from_value(row.storage)
            .map_err(|e| CatalogError::Serialization(format!("media {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            filename: row.filename,
            original_name: row.original_name,
            mimetype: row.mimetype,
            size: u64::try_from(row.size).unwrap_or(0),
            storage,
            uploader: row.uploader,
            message: row.message,
            uploaded_at: row.uploaded_at,
        })
    }
}
