use serde::{Deserialize, Serialize};

/// Page used when the request names none.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the request names none.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size honoured unless configured otherwise.
pub const DEFAULT_MAX_LIMIT: u32 = 100;

/// A validated page request for media listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Records per page, at least 1.
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Create a page request, clamping both values to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a page request from raw query-string values.
    ///
    /// Values are parsed from their leading integer prefix. Missing,
    /// unparseable or zero values use the defaults; negative values clamp to
    /// 1; `limit` is capped at `max_limit`.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, max_limit: u32) -> Self {
        let page = resolve(page, DEFAULT_PAGE, u32::MAX);
        let limit = resolve(limit, DEFAULT_LIMIT, max_limit.max(1));
        Self { page, limit }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

fn resolve(raw: Option<&str>, default: u32, max: u32) -> u32 {
    match raw.and_then(parse_leading_int) {
        None | Some(0) => default.min(max),
        Some(n) if n < 0 => 1,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX).min(max),
    }
}

/// Parse the leading `[+-]?[0-9]+` prefix of `raw`, ignoring surrounding
/// whitespace. Overflowing values saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Pagination block returned alongside a page of media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    /// Total number of records.
    pub total: u64,
    /// Number of pages, `ceil(total / limit)`.
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(limit),
        }
    }
}
