//! Local filesystem storage for uploaded media.

mod store;

pub use store::LocalDiskBackend;
