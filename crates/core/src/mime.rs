/// Whether a declared content type may be stored: only `image/*` and
/// `video/*` are accepted.
pub fn is_accepted_mime(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    mime.starts_with("image/") || mime.starts_with("video/")
}

/// Lower-cased extension of a client filename, restricted to ASCII
/// alphanumerics so it is safe to reuse in storage names.
///
/// Returns `None` when the name has no usable extension.
pub fn extension_of(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
