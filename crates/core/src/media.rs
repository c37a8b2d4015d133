use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::locator::StorageLocator;

/// Attribution used when an upload names no uploader.
pub const DEFAULT_UPLOADER: &str = "Guest";

/// Maximum length of the free-text upload message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Age after which a media record expires (30 days).
pub const DEFAULT_RECORD_TTL_SECONDS: u64 = 2_592_000;

/// Metadata for one uploaded media file.
///
/// Records are created together with their stored bytes and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MediaRecord {
    /// Unique record identifier (UUID v7).
    pub id: String,
    /// Storage-assigned name, unique per stored object.
    pub filename: String,
    /// Filename supplied by the client.
    pub original_name: String,
    /// Declared content type (`image/*` or `video/*`).
    pub mimetype: String,
    /// Size of the stored object in bytes.
    pub size: u64,
    /// Where the bytes live.
    pub storage: StorageLocator,
    /// Free-text attribution.
    pub uploader: String,
    /// Free-text annotation.
    #[serde(default)]
    pub message: String,
    /// When the record was created.
    pub uploaded_at: DateTime<Utc>,
}

/// The subset of a record returned from an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MediaSummary {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub storage: StorageLocator,
    pub uploaded_at: DateTime<Utc>,
}

/// The upload message exceeded [`MAX_MESSAGE_CHARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTooLong {
    /// Character count of the rejected message.
    pub chars: usize,
}

impl std::fmt::Display for MessageTooLong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "message is {} characters, maximum is {MAX_MESSAGE_CHARS}",
            self.chars
        )
    }
}

impl std::error::Error for MessageTooLong {}

/// Generate a fresh, time-ordered media identifier.
pub fn new_media_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

impl MediaRecord {
    /// Build the summary returned to uploaders.
    pub fn summary(&self) -> MediaSummary {
        MediaSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            original_name: self.original_name.clone(),
            mimetype: self.mimetype.clone(),
            size: self.size,
            storage: self.storage.clone(),
            uploaded_at: self.uploaded_at,
        }
    }

    /// When this record becomes eligible for removal under `ttl`.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.uploaded_at + ttl
    }

    /// Whether the record has outlived `ttl` as of `now`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at(ttl) <= now
    }

    /// Resolve the uploader attribution, falling back to [`DEFAULT_UPLOADER`]
    /// for missing or blank values.
    pub fn resolve_uploader(raw: Option<&str>) -> String {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_UPLOADER)
            .to_owned()
    }

    /// Check an upload message against [`MAX_MESSAGE_CHARS`].
    pub fn validate_message(message: &str) -> Result<(), MessageTooLong> {
        let chars = message.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(MessageTooLong { chars });
        }
        Ok(())
    }
}
