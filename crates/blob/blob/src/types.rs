use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use mediadrop_core::{StorageLocator, extension_of};
use tokio::io::AsyncRead;

/// One validated file part, ready to be written.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    /// Filename supplied by the client.
    pub original_name: String,
    /// Declared content type.
    pub content_type: String,
    /// The file bytes.
    pub data: Bytes,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Storage-assigned filename.
    pub filename: String,
    /// Where the bytes now live.
    pub locator: StorageLocator,
    /// Number of bytes written.
    pub size: u64,
    /// Content type recorded with the object.
    pub content_type: String,
}

/// Boxed byte stream handed back to the HTTP layer.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// How stored bytes are delivered to a client.
pub enum BlobContent {
    /// Stream the bytes through the server.
    Stream {
        /// Reader positioned at the start of the object.
        reader: BlobReader,
        /// Total length of the object in bytes.
        size: u64,
    },
    /// Redirect the client to a public URL.
    Redirect(String),
}

impl fmt::Debug for BlobContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream { size, .. } => f
                .debug_struct("Stream")
                .field("size", size)
                .finish_non_exhaustive(),
            Self::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
        }
    }
}

/// Build a fresh storage filename for `original_name`: a time-ordered UUID
/// followed by the original's extension, if it has a safe one.
pub fn storage_filename(original_name: &str) -> String {
    let id = uuid::Uuid::now_v7().simple();
    match extension_of(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
