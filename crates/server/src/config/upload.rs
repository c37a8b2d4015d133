use serde::Deserialize;

use mediadrop_core::DEFAULT_MAX_LIMIT;

const MIB: u64 = 1024 * 1024;

/// Upload validation limits.
///
/// # Example
///
/// ```toml
/// [upload]
/// field_name = "media"
/// max_files = 10
/// max_file_size_mb = 10
/// allowed_extensions = ["jpg", "png", "mp4", "mov"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Multipart field name file parts must use.
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// Maximum number of files per request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single file, in MiB.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// Accepted file extensions, lower-case. Empty accepts any extension.
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    /// Largest page size `GET /media` honours.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            max_files: default_max_files(),
            max_file_size_mb: default_max_file_size_mb(),
            allowed_extensions: Vec::new(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl UploadConfig {
    /// Per-file limit in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        usize::try_from(self.max_file_size_mb.saturating_mul(MIB)).unwrap_or(usize::MAX)
    }

    /// Request body limit: every file at full size plus 1 MiB of form
    /// overhead.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_file_size_bytes()
            .saturating_mul(self.max_files.max(1))
            .saturating_add(1024 * 1024)
    }

    /// Whether the extension allow-list admits `extension`.
    pub fn allows_extension(&self, extension: Option<&str>) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        extension.is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
    }
}

fn default_field_name() -> String {
    "media".to_owned()
}

fn default_max_files() -> usize {
    10
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_max_page_size() -> u32 {
    DEFAULT_MAX_LIMIT
}
