//! URL handling module for AppImage-Ripple
//!
//! This module provides link resolution against the page a link was found
//! on, host extraction, and host pattern matching for the artifact
//! classifier.

mod domain;
mod resolve;

pub use domain::{extract_domain, host_matches, host_matches_any};
pub use resolve::{canonical_seed, is_followable, resolve_link};

use crate::UrlError;
use url::Url;

/// Parses an absolute `http`/`https` URL
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The input is not an absolute web URL
pub fn parse_web_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
