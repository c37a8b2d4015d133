pub mod locator;
pub mod media;
pub mod mime;
pub mod page;

pub use locator::{BackendKind, StorageLocator};
pub use media::{
    DEFAULT_RECORD_TTL_SECONDS, DEFAULT_UPLOADER, MAX_MESSAGE_CHARS, MediaRecord, MediaSummary,
    MessageTooLong, new_media_id,
};
pub use mime::{extension_of, is_accepted_mime};
pub use page::{DEFAULT_LIMIT, DEFAULT_MAX_LIMIT, DEFAULT_PAGE, PageRequest, Pagination};
