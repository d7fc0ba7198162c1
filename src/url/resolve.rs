//! Link resolution
//!
//! Turns raw `href` values into absolute, fragment-free URLs. Every URL the
//! crawler stores or compares goes through `Url` serialization here, so two
//! spellings of the same address compare equal.

use super::parse_web_url;
use crate::UrlError;
use url::Url;

/// Schemes that never lead to a downloadable resource
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "ftp:"];

/// Resolves an anchor `href` against the page it was found on
///
/// # Resolution Rules
///
/// | href | result |
/// |------|--------|
/// | `""`, `"/"`, `"#..."` | filtered out (`None`) |
/// | `javascript:`, `mailto:`, `tel:`, `data:` | filtered out |
/// | `https://other/y#f` | `https://other/y` (absolute, fragment dropped) |
/// | `HTTPS://Other` | `https://other/` (absolute, re-serialized) |
/// | `//cdn.host/x` | base scheme + `//cdn.host/x` |
/// | `/x` | base scheme and host + `/x`; the base path is discarded |
/// | `x` | joined against the base path (`Url::join`) |
///
/// Root-relative links are always anchored at the origin of `base_url`,
/// never at the directory of the current page.
///
/// # Examples
///
/// ```
/// use appimage_ripple::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://h/old/path").unwrap();
/// assert_eq!(resolve_link("/x", &base), Some("https://h/x".to_string()));
/// assert_eq!(resolve_link("#frag", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if !is_followable(href) {
        return None;
    }

    let href = strip_fragment(href);
    if href.is_empty() {
        return None;
    }

    if let Ok(absolute) = Url::parse(href) {
        return is_http(&absolute).then(|| absolute.to_string());
    }

    if let Some(rest) = href.strip_prefix("//") {
        return serialize_http(&format!("{}://{}", base_url.scheme(), rest));
    }

    if href.starts_with('/') {
        base_url.host_str()?;
        return serialize_http(&format!("{}{}", base_url.origin().ascii_serialization(), href));
    }

    let mut joined = base_url.join(href).ok()?;
    joined.set_fragment(None);
    is_http(&joined).then(|| joined.to_string())
}

/// Returns true if an href should be considered for resolution at all
///
/// Fragment-only anchors and self-links to `/` are dropped here, before any
/// resolution is attempted.
pub fn is_followable(href: &str) -> bool {
    if href.is_empty() || href == "/" || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !IGNORED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Serializes a package seed the same way [`resolve_link`] serializes links
///
/// # Returns
///
/// * `Ok(String)` - The seed as an absolute URL without fragment
/// * `Err(UrlError)` - Empty, relative or non-web seeds
pub fn canonical_seed(seed: &str) -> Result<String, UrlError> {
    let mut url = parse_web_url(seed)?;
    url.set_fragment(None);
    Ok(url.to_string())
}

fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    }
}

fn serialize_http(candidate: &str) -> Option<String> {
    Url::parse(candidate)
        .ok()
        .filter(is_http)
        .map(|url| url.to_string())
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}
