//! Link resolution for document hrefs found in the index table
//!
//! Resolution is plain string concatenation against a configured base URL.
//! No normalization is attempted: `../` segments, doubled slashes and
//! percent-encoding pass through untouched, and a root-relative href such as
//! `/legislacion/x.pdf` is appended to the base as-is.

use crate::models::Entry;

/// Resolves raw hrefs from the index table into absolute URLs
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base_url: String,
}

impl LinkResolver {
    /// Create a resolver for links relative to `base_url`
    ///
    /// # Examples
    ///
    /// ```
    /// use docsieve::crawler::url::LinkResolver;
    ///
    /// let resolver = LinkResolver::new("https://example.com/indices/");
    /// assert_eq!(resolver.resolve("r001.pdf"), "https://example.com/indices/r001.pdf");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a raw href
    pub fn resolve(&self, link_raw: &str) -> String {
        if is_root_relative(link_raw) && self.base_url.ends_with('/') {
            tracing::debug!(
                link = %link_raw,
                base = %self.base_url,
                "Root-relative link appended to base URL verbatim"
            );
        }
        resolve_link(link_raw, &self.base_url)
    }

    /// Resolve the link of an entry
    pub fn resolve_entry(&self, entry: &Entry) -> String {
        self.resolve(&entry.link_raw)
    }
}

/// Absolute URL for `link_raw`
///
/// Links starting with `http` are used unchanged, anything else is appended
/// to `base_url`.
pub fn resolve_link(link_raw: &str, base_url: &str) -> String {
    if link_raw.starts_with("http") {
        link_raw.to_string()
    } else {
        format!("{base_url}{link_raw}")
    }
}

/// File name for a link: everything after the last `/`
///
/// Returns `None` when that segment is empty.
///
/// # Examples
///
/// ```
/// use docsieve::crawler::url::document_name;
///
/// assert_eq!(document_name("../2015/res001.pdf"), Some("res001.pdf"));
/// assert_eq!(document_name("plain.pdf"), Some("plain.pdf"));
/// assert_eq!(document_name("folder/"), None);
/// ```
pub fn document_name(link_raw: &str) -> Option<&str> {
    let name = link_raw.rsplit('/').next().unwrap_or(link_raw);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn is_root_relative(link_raw: &str) -> bool {
    link_raw.starts_with('/') && !link_raw.starts_with("//")
}
