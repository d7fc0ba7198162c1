//! Crawler module for artifact discovery
//!
//! This module contains the core crawling logic, including:
//! - HEAD probes and page fetches with optional retries
//! - HTML anchor extraction and link resolution
//! - Artifact classification by host, path and file suffix
//! - The per-package traversal and the catalog-wide coordination

mod classifier;
mod coordinator;
mod engine;
mod fetcher;
mod parser;

pub use classifier::{content_length, platform_for_filename, ArtifactClassifier};
pub use coordinator::{run_catalog, Coordinator, RunOptions};
pub use engine::{crawl_package, CrawlOutcome, RunContext};
pub use fetcher::{build_http_client, FetchError, Fetcher, Page, Probe};
pub use parser::{parse_html, ParsedPage};
