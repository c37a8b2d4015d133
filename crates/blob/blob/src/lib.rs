pub mod error;
pub mod store;
pub mod testing;
pub mod types;

pub use error::BlobError;
pub use store::{BlobStore, ensure_kind};
pub use types::{BlobContent, BlobReader, BlobUpload, StoredBlob, storage_filename};
