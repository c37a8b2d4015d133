use std::sync::Arc;

use mediadrop_catalog::MediaCatalog;
use mediadrop_catalog_memory::MemoryMediaCatalog;
#[cfg(feature = "postgres")]
use mediadrop_catalog_postgres::{PostgresCatalogConfig, PostgresMediaCatalog};

use crate::config::CatalogConfig;
use crate::error::ServerError;

/// Create the catalog selected by `[catalog] backend`.
///
/// Database backends run their migrations while connecting.
#[allow(clippy::unused_async)]
pub async fn create_catalog(config: &CatalogConfig) -> Result<Arc<dyn MediaCatalog>, ServerError> {
    let catalog: Arc<dyn MediaCatalog> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryMediaCatalog::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("postgres catalog requires [catalog] url".into())
            })?;

            let pg_config = PostgresCatalogConfig::new(url)
                .with_prefix(&config.prefix)
                .with_max_connections(config.max_connections);

            Arc::new(PostgresMediaCatalog::new(&pg_config).await?)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported catalog backend: {other} (is the matching feature enabled?)"
            )));
        }
    };
    Ok(catalog)
}
