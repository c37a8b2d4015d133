pub mod config;
pub mod migrations;
pub mod store;

pub use config::PostgresCatalogConfig;
pub use store::PostgresMediaCatalog;
