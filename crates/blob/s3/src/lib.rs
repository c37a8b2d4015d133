//! S3-compatible object storage for uploaded media.
//!
//! Objects are written under a key prefix and served to clients by
//! redirecting them to the object's public URL.

pub mod auth;
pub mod config;
mod store;

pub use config::{AwsBaseConfig, S3StorageConfig};
pub use store::ObjectStoreBackend;
