use url::Url;

/// Longest file stem produced from a URL, in characters
pub const MAX_STEM_CHARS: usize = 200;

/// Replaces every character that is unsafe in a file name with `_`
///
/// Alphanumerics (including non-ASCII letters and digits), `_`, `-` and `.`
/// are kept.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Builds a file stem `{host}_{path}` for a page URL
///
/// The path has its surrounding slashes removed before sanitizing, and the
/// result is cut to [`MAX_STEM_CHARS`]. Unparseable input is sanitized as a
/// whole so every URL still maps to some name.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::file_stem;
///
/// assert_eq!(file_stem("https://a.test/docs/intro/"), "a.test_docs_intro");
/// assert_eq!(file_stem("https://a.test/"), "a.test_");
/// ```
pub fn file_stem(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let host = match parsed.port() {
                Some(port) => format!("{}_{}", host, port),
                None => host.to_string(),
            };
            format!("{}_{}", host, parsed.path().trim_matches('/'))
        }
        Err(_) => url.to_string(),
    };

    sanitize_file_name(&raw).chars().take(MAX_STEM_CHARS).collect()
}
