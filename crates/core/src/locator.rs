use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of storage backend holds a media object's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum BackendKind {
    /// Bytes live on the server's local filesystem and are streamed back.
    Local,
    /// Bytes live in a remote object store and clients are redirected to them.
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Backend-specific reference needed to read or delete stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum StorageLocator {
    /// A file under the local storage root.
    Local {
        /// Path of the stored file.
        path: String,
    },
    /// An object in a remote object store.
    Remote {
        /// Public URL the object is served from.
        url: String,
        /// Store-side identifier (object key) used for deletion.
        #[serde(rename = "objectId")]
        object_id: String,
    },
}

impl StorageLocator {
    /// The backend kind this locator belongs to.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local { .. } => BackendKind::Local,
            Self::Remote { .. } => BackendKind::Remote,
        }
    }

    /// The human-facing reference: the URL for remote objects, the path for
    /// local files.
    pub fn reference(&self) -> &str {
        match self {
            Self::Local { path } => path,
            Self::Remote { url, .. } => url,
        }
    }
}
