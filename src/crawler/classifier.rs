//! Artifact classification
//!
//! Decides, from a URL and the headers of a response already fetched for it,
//! whether the resource is an installable artifact and for which platform.
//! The rules are an explicit allow-list kept deliberately narrow so that
//! arbitrary binaries linked from a project page are not picked up.

use crate::catalog::{Artifact, Platform};
use crate::url::{extract_domain, host_matches_any};
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use url::Url;

/// Filename suffix → platform decision table, checked in order
const SUFFIX_TABLE: &[(&str, Platform)] = &[
    (".dmg", Platform::MacOs),
    (".exe", Platform::Windows),
    ("AppImage", Platform::Linux),
];

/// Path segment every accepted artifact URL must contain
const RELEASES_SEGMENT: &str = "/releases/";

/// Classifies release files served from a set of trusted hosts
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    hosts: Vec<String>,
}

impl ArtifactClassifier {
    /// Creates a classifier accepting the given host patterns
    pub fn new(hosts: Vec<String>) -> Self {
        Self { hosts }
    }

    /// Determines the platform of a URL without looking at any response
    ///
    /// # Rules
    ///
    /// 1. The host must match one of the configured host patterns
    /// 2. The path must contain a `/releases/` segment
    /// 3. The last path component must end in a suffix from the table:
    ///
    /// | suffix | platform |
    /// |--------|----------|
    /// | `.dmg` | macOS |
    /// | `.exe` | Windows |
    /// | `AppImage` | Linux |
    pub fn platform_for(&self, url: &Url) -> Option<Platform> {
        let host = extract_domain(url)?;
        if !host_matches_any(&self.hosts, &host) {
            return None;
        }

        let path = url.path();
        if !path.contains(RELEASES_SEGMENT) {
            return None;
        }

        let filename = path.rsplit('/').next().filter(|f| !f.is_empty())?;
        platform_for_filename(filename)
    }

    /// Classifies a probed resource
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the resource was requested at
    /// * `headers` - Headers of the probe response
    ///
    /// # Returns
    ///
    /// * `Some(Artifact)` - The resource is an artifact; `filesize` comes from
    ///   `Content-Length` when present and numeric
    /// * `None` - Not an artifact
    pub fn classify(&self, url: &str, headers: &HeaderMap) -> Option<Artifact> {
        let parsed = Url::parse(url).ok()?;
        let os = self.platform_for(&parsed)?;
        Some(Artifact::new(url, os, content_length(headers)))
    }
}

impl Default for ArtifactClassifier {
    fn default() -> Self {
        Self::new(vec!["github.com".to_string()])
    }
}

/// Looks a filename up in the suffix table
pub fn platform_for_filename(filename: &str) -> Option<Platform> {
    SUFFIX_TABLE
        .iter()
        .find(|(suffix, _)| filename.ends_with(suffix))
        .map(|(_, platform)| *platform)
}

/// Reads `Content-Length`; absent or unparsable values give `None`
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
