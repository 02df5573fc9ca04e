//! robots.txt rules and `Sitemap:` directives
//!
//! Allow/deny questions go to the robotstxt crate's matcher. `Sitemap:` lines
//! apply to the whole file regardless of user-agent groups, so they are read
//! directly from the text.

use robotstxt::DefaultMatcher;

/// Directive prefix announcing a sitemap location (matched case-insensitively)
const SITEMAP_DIRECTIVE: &str = "sitemap:";

/// A fetched robots.txt file
///
/// An empty file imposes no rules and announces no sitemaps.
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules used when robots.txt is unavailable: everything is allowed
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether `user_agent` may fetch the absolute `url`
    ///
    /// `user_agent` may be a full `User-Agent` header; groups are matched
    /// against its product token (see [`product_token`]).
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        DefaultMatcher::default().one_agent_allowed_by_robots(
            &self.content,
            product_token(user_agent),
            url,
        )
    }

    /// Returns every `Sitemap:` directive value in file order
    ///
    /// A line matches when it starts with `sitemap:` in any letter case; the
    /// value is everything after the first colon, trimmed. Lines whose value is
    /// blank are ignored.
    pub fn sitemap_directives(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let prefix = line.get(..SITEMAP_DIRECTIVE.len())?;
                if !prefix.eq_ignore_ascii_case(SITEMAP_DIRECTIVE) {
                    return None;
                }
                let value = line[SITEMAP_DIRECTIVE.len()..].trim();
                (!value.is_empty()).then(|| value.to_string())
            })
            .collect()
    }

    /// Returns the first `Sitemap:` directive value, if any
    pub fn first_sitemap(&self) -> Option<String> {
        self.sitemap_directives().into_iter().next()
    }
}

/// Product token of a `User-Agent` header, as named in `User-agent:` lines
///
/// This is the text before the first `/` or whitespace, so
/// `Mozilla/5.0 (X11; Linux)` becomes `Mozilla`. A value without either
/// separator is returned trimmed.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    trimmed
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or(trimmed)
}
