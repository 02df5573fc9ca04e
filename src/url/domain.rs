use crate::UrlError;
use url::Url;

/// Extracts the lowercase host from a URL string
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Builds the robots.txt address for the site serving `url`
///
/// Scheme, host and port are kept; path, query and fragment are replaced.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::robots_url;
///
/// let robots = robots_url("https://a.test/blog/sitemap.xml").unwrap();
/// assert_eq!(robots, "https://a.test/robots.txt");
/// ```
pub fn robots_url(url: &str) -> Result<String, UrlError> {
    let mut parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    parsed.set_path("/robots.txt");
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed.to_string())
}
