//! Upstream catalog feed retrieval
//!
//! The feed is a JSON document whose top-level `items` array holds the
//! package records. It is fetched once at the start of a fresh run.

use super::Package;
use crate::RippleError;
use reqwest::Client;
use serde_json::Value;

/// Downloads and parses the catalog feed
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `feed_url` - Location of the JSON feed
///
/// # Returns
///
/// * `Ok(Vec<Package>)` - The packages listed under `items`
/// * `Err(RippleError)` - Network failure, non-success status or malformed feed
pub async fn fetch_feed(client: &Client, feed_url: &str) -> Result<Vec<Package>, RippleError> {
    tracing::info!("Downloading catalog feed from {}", feed_url);

    let response = client
        .get(feed_url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| RippleError::Http {
            url: feed_url.to_string(),
            source,
        })?;

    let body = response.text().await.map_err(|source| RippleError::Http {
        url: feed_url.to_string(),
        source,
    })?;

    let packages = parse_feed(&body)?;
    tracing::info!("Feed lists {} packages", packages.len());
    Ok(packages)
}

/// Parses a feed document into packages
pub fn parse_feed(body: &str) -> Result<Vec<Package>, RippleError> {
    let mut document: Value = serde_json::from_str(body)?;

    let items = document
        .get_mut("items")
        .map(Value::take)
        .ok_or_else(|| RippleError::Feed("feed has no top-level `items` array".to_string()))?;

    if !items.is_array() {
        return Err(RippleError::Feed("`items` is not an array".to_string()));
    }

    Ok(serde_json::from_value(items)?)
}
