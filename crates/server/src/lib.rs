pub mod api;
pub mod blob_factory;
pub mod catalog_factory;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod upload;
