use mediadrop_core::BackendKind;
use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The locator belongs to a different kind of backend.
    #[error("locator for {found} storage handed to {expected} backend")]
    ForeignLocator {
        /// Kind of the backend that received the locator.
        expected: BackendKind,
        /// Kind the locator actually refers to.
        found: BackendKind,
    },

    /// The locator does not point inside this backend's storage area.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// A filesystem error occurred.
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is misconfigured.
    #[error("blob store configuration error: {0}")]
    Configuration(String),
}
