//! Configuration module for AppImage-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. A configuration file is optional: every key has a default that
//! reproduces the classic behavior (depth 1, one package at a time, a single
//! attempt per request, checkpoint after every package).
//!
//! # Example
//!
//! ```no_run
//! use appimage_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Crawler will follow {} hop(s)", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    default_snapshot_path, CatalogConfig, Config, CrawlerConfig, UserAgentConfig,
    DEFAULT_FEED_URL,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
