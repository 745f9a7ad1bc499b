//! Mapping stored image paths to fetch URLs and file extensions.

/// Extension used when the path carries none
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Build the full image URL for a stored path
///
/// The path is trimmed and exactly one leading `/` is removed before it is
/// appended to `base_url`. Returns `None` for a missing or blank path.
///
/// # Examples
///
/// ```
/// use franchise_logo_dl::fetch::resolve_url;
///
/// let base = "https://cdn.example.com/";
/// assert_eq!(
///     resolve_url(base, Some("/logos/a.png")).as_deref(),
///     Some("https://cdn.example.com/logos/a.png")
/// );
/// assert_eq!(resolve_url(base, Some("  ")), None);
/// assert_eq!(resolve_url(base, None), None);
/// ```
#[must_use]
pub fn resolve_url(base_url: &str, image_path: Option<&str>) -> Option<String> {
    let path = image_path?.trim();
    if path.is_empty() {
        return None;
    }
    let path = path.strip_prefix('/').unwrap_or(path);
    Some(format!("{}{}", base_url, path))
}

/// Extract a lower-case file extension from an image path or URL
///
/// Only the path component counts: query strings and fragments are ignored,
/// and for absolute URLs the host never contributes. Falls back to
/// [`DEFAULT_EXTENSION`].
///
/// # Examples
///
/// ```
/// use franchise_logo_dl::fetch::extract_extension;
///
/// assert_eq!(extract_extension("/img/logo.PNG?x=1"), "png");
/// assert_eq!(extract_extension("/img/logo"), "jpg");
/// ```
#[must_use]
pub fn extract_extension(image_path: &str) -> String {
    let trimmed = image_path.trim();

    let path = match url::Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    std::path::Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
