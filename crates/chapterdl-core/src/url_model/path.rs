//! Image file extension from a URL path.

/// Extension used when the URL path has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Lowercase extension of the last URL path segment (query and fragment ignored).
///
/// Falls back to `jpg` when the URL cannot be parsed or the segment has no
/// usable extension.
pub fn extension_from_url(url: &str) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return DEFAULT_EXTENSION.to_string();
    };
    let Some(segment) = parsed.path().split('/').filter(|s| !s.is_empty()).last() else {
        return DEFAULT_EXTENSION.to_string();
    };
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}
