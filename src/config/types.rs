use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for AppImage-Ripple
///
/// Every section and key is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub catalog: CatalogConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// HTML hops followed from each package's download page
    pub max_depth: u32,

    /// Packages crawled concurrently
    pub max_concurrent_packages: u32,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Extra attempts after a transient failure; 0 keeps single-attempt behavior
    pub max_retries: u32,

    /// Pause between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Hosts whose release files are accepted as artifacts ("*.x.y" allowed)
    pub artifact_hosts: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_concurrent_packages: 1,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 0,
            retry_delay_ms: 500,
            artifact_hosts: vec!["github.com".to_string()],
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Catalog source and snapshot configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// JSON feed listing the packages (fresh runs only)
    pub feed_url: String,

    /// Snapshot file the catalog is checkpointed to
    pub snapshot_path: PathBuf,

    /// Checkpoint after every package instead of only at the end
    pub save_often: bool,

    /// Packages to crawl before stopping; 0 means no limit
    pub max_loops: u64,

    /// Wall-clock limit for a run (seconds); 0 means no limit
    pub max_run_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            snapshot_path: default_snapshot_path(),
            save_often: true,
            max_loops: 0,
            max_run_secs: 0,
        }
    }
}

/// Upstream AppImage catalog feed
pub const DEFAULT_FEED_URL: &str = "https://appimage.github.io/feed.json";

/// `~/.config/appimages-util/appimages.json`
///
/// Falls back to a path relative to the working directory only when the
/// platform reports no home directory at all.
pub fn default_snapshot_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_default();

    home.join(".config")
        .join("appimages-util")
        .join("appimages.json")
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}
