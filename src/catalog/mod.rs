//! Catalog data model
//!
//! A catalog is the list of packages read from the upstream feed, each
//! augmented with the artifacts discovered by the crawler. The same types are
//! used for the feed, the in-memory catalog and the on-disk snapshot.

mod feed;

pub use feed::{fetch_feed, parse_feed};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Link kind that designates the crawl seed of a package
pub const DOWNLOAD_LINK_KIND: &str = "Download";

/// Target platform of an installable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "linux")]
    Linux,
    #[serde(rename = "win32")]
    Windows,
    #[serde(rename = "darwin")]
    MacOs,
}

impl Platform {
    /// All platforms, in report order
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::MacOs];

    /// The identifier used in the snapshot file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "win32",
            Self::MacOs => "darwin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered downloadable resource
///
/// Two artifacts are equal when they share URL and platform; the size is
/// informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Absolute URL of the resource
    pub url: String,

    /// Platform the resource installs on
    pub os: Platform,

    /// Size in bytes, if the server reported `Content-Length`
    #[serde(default)]
    pub filesize: Option<u64>,
}

impl Artifact {
    pub fn new(url: impl Into<String>, os: Platform, filesize: Option<u64>) -> Self {
        Self {
            url: url.into(),
            os,
            filesize,
        }
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.os == other.os
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.os.hash(state);
    }
}

/// A typed link attached to a package (`{"type": "Download", "url": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Package author as listed in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One catalog entry
///
/// Fields the crawler does not know about are kept in `extra` so a snapshot
/// round-trips the feed without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub categories: Option<Vec<String>>,

    #[serde(default)]
    pub authors: Option<Vec<Author>>,

    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub links: Option<Vec<Link>>,

    #[serde(default)]
    pub icons: Option<Vec<String>>,

    #[serde(default)]
    pub screenshots: Option<Vec<String>>,

    /// Discovered artifacts; `None` until the package has been crawled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<Artifact>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Package {
    /// Creates a package with only a name, mostly useful in tests
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            categories: None,
            authors: None,
            license: None,
            links: None,
            icons: None,
            screenshots: None,
            versions: None,
            extra: Map::new(),
        }
    }

    /// Adds a link of the given kind, builder style
    pub fn with_link(mut self, kind: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.get_or_insert_with(Vec::new).push(Link {
            kind: kind.into(),
            url: url.into(),
        });
        self
    }

    /// Returns the URL of the first link of the given kind (case-insensitive)
    pub fn link(&self, kind: &str) -> Option<&str> {
        self.links
            .as_deref()?
            .iter()
            .find(|l| l.kind.eq_ignore_ascii_case(kind))
            .map(|l| l.url.as_str())
    }

    /// The crawl seed: the URL of the "Download" link
    pub fn seed_url(&self) -> Option<&str> {
        self.link(DOWNLOAD_LINK_KIND)
    }

    /// Whether a crawl of this package has completed at least once
    pub fn is_crawled(&self) -> bool {
        self.versions.is_some()
    }

    /// Whether the package carries at least one artifact
    pub fn has_artifacts(&self) -> bool {
        !self.artifacts().is_empty()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        self.versions.as_deref().unwrap_or_default()
    }

    /// Artifacts targeting one platform
    pub fn artifacts_for(&self, platform: Platform) -> impl Iterator<Item = &Artifact> {
        self.artifacts().iter().filter(move |a| a.os == platform)
    }

    /// Merges freshly crawled artifacts into the package and marks it crawled
    ///
    /// Artifacts already present (same URL and platform) are skipped.
    ///
    /// # Returns
    ///
    /// The number of artifacts actually added
    pub fn merge_artifacts(&mut self, found: Vec<Artifact>) -> usize {
        let versions = self.versions.get_or_insert_with(Vec::new);
        let before = versions.len();

        for artifact in found {
            if !versions.contains(&artifact) {
                versions.push(artifact);
            }
        }

        versions.len() - before
    }
}
