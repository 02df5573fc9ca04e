/// Marker substring that identifies an address as a sitemap document
const SITEMAP_MARKER: &str = "sitemap";

/// Sitemap file name tried when a site address does not name one
const DEFAULT_SITEMAP_PATH: &str = "/sitemap.xml";

/// Normalizes a user-supplied site address
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Remove every trailing slash
/// 3. Prepend `https://` when neither `http://` nor `https://` is present
///
/// The result always carries an explicit scheme and never ends with `/`.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::normalize_site_url;
///
/// assert_eq!(normalize_site_url("example.com/"), "https://example.com");
/// assert_eq!(normalize_site_url("http://example.com"), "http://example.com");
/// ```
pub fn normalize_site_url(site_url: &str) -> String {
    let trimmed = site_url.trim().trim_end_matches('/');

    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Returns the sitemap address to try first for a site address
///
/// Addresses that already mention a sitemap (in any letter case) are used
/// as-is; anything else gets `/sitemap.xml` appended.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::sitemap_candidate;
///
/// assert_eq!(sitemap_candidate("example.com"), "https://example.com/sitemap.xml");
/// assert_eq!(
///     sitemap_candidate("https://a.test/Sitemap_Index.xml"),
///     "https://a.test/Sitemap_Index.xml"
/// );
/// ```
pub fn sitemap_candidate(site_url: &str) -> String {
    let normalized = normalize_site_url(site_url);

    if names_sitemap(&normalized) {
        normalized
    } else {
        format!("{}{}", normalized, DEFAULT_SITEMAP_PATH)
    }
}

/// Checks whether an address already points at a sitemap document
pub fn names_sitemap(url: &str) -> bool {
    url.to_lowercase().contains(SITEMAP_MARKER)
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
