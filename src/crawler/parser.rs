//! HTML parser for extracting links
//!
//! Only `<a href>` anchors are followed: release pages list their assets as
//! plain anchors, and nothing else on a page can lead to an artifact.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Resolved anchor targets, in document order, without duplicates
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the page's anchor links
///
/// # Link Extraction Rules
///
/// - every `<a href="...">`, including ones carrying a `download` attribute
/// - hrefs are resolved with [`resolve_link`] against `base_url`; fragment-only
///   anchors, self-links and non-web schemes are dropped
/// - repeated targets are kept once, at their first position
///
/// # Example
///
/// ```
/// use appimage_ripple::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/o/r/releases/download/v1/App.AppImage">App</a></body></html>"#;
/// let base_url = Url::parse("https://github.com/o/r/releases").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links, vec!["https://github.com/o/r/releases/download/v1/App.AppImage"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute) = resolve_link(href, base_url) {
            if !links.contains(&absolute) {
                links.push(absolute);
            }
        }
    }

    links
}
