//! Sitemap XML document parsing
//!
//! Documents follow the sitemaps.org 0.9 schema: the root element is either
//! `<sitemapindex>` (entries are child sitemaps) or `<urlset>` (entries are
//! pages). Only `<loc>` elements bound to the sitemap namespace are read.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

/// XML namespace of the sitemaps.org 0.9 schema
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Errors produced while reading a sitemap document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    Empty,

    #[error("root element <{0}> is not in the sitemap namespace")]
    ForeignRoot(String),

    #[error("document ended inside <{0}>")]
    Truncated(String),
}

/// What the entries of a sitemap document point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `<sitemapindex>`: entries are other sitemap documents
    Index,
    /// Any other root, normally `<urlset>`: entries are pages
    UrlSet,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: DocumentKind,
    /// `<loc>` values in document order, trimmed, blanks dropped
    pub locations: Vec<String>,
}

impl SitemapDocument {
    pub fn is_index(&self) -> bool {
        self.kind == DocumentKind::Index
    }
}

/// Parses a sitemap or sitemap index
///
/// # Examples
///
/// ```
/// use sitemap_harvest::sitemap::{parse_document, DocumentKind};
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://a.test/</loc></url>
/// </urlset>"#;
/// let doc = parse_document(xml).unwrap();
/// assert_eq!(doc.kind, DocumentKind::UrlSet);
/// assert_eq!(doc.locations, vec!["https://a.test/"]);
/// ```
pub fn parse_document(xml: &str) -> Result<SitemapDocument, DocumentError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind: Option<DocumentKind> = None;
    let mut locations = Vec::new();
    let mut open_elements: Vec<String> = Vec::new();
    let mut current_loc: Option<String> = None;

    loop {
        let position = reader.buffer_position();

        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let in_namespace = is_sitemap_namespace(&ns);

                if kind.is_none() {
                    kind = Some(root_kind(&name, in_namespace)?);
                }
                if in_namespace && name == "loc" {
                    current_loc = Some(String::new());
                }
                open_elements.push(name);
            }
            Ok((ns, Event::Empty(e))) => {
                if kind.is_none() {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    kind = Some(root_kind(&name, is_sitemap_namespace(&ns))?);
                }
            }
            Ok((_, Event::Text(e))) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = e.unescape().map_err(|err| DocumentError::Malformed {
                        position,
                        message: err.to_string(),
                    })?;
                    loc.push_str(&text);
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok((ns, Event::End(e))) => {
                open_elements.pop();
                if is_sitemap_namespace(&ns) && e.local_name().as_ref() == b"loc" {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locations.push(loc.to_string());
                        }
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocumentError::Malformed {
                    position,
                    message: e.to_string(),
                })
            }
        }
    }

    if let Some(unclosed) = open_elements.pop() {
        return Err(DocumentError::Truncated(unclosed));
    }

    let kind = kind.ok_or(DocumentError::Empty)?;
    Ok(SitemapDocument { kind, locations })
}

fn is_sitemap_namespace(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE.as_bytes())
}

fn root_kind(name: &str, in_namespace: bool) -> Result<DocumentKind, DocumentError> {
    if !in_namespace {
        return Err(DocumentError::ForeignRoot(name.to_string()));
    }
    if name.ends_with("sitemapindex") {
        Ok(DocumentKind::Index)
    } else {
        Ok(DocumentKind::UrlSet)
    }
}
