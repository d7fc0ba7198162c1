//! Output module for run reports
//!
//! This module handles:
//! - Live statistics counters shared by all crawl tasks
//! - The end-of-run statistics report
//! - Offline summaries of a saved catalog

pub mod stats;
mod summary;

pub use stats::{CrawlStatistics, StatisticsReport};
pub use summary::{summarize_catalog, CatalogSummary};

/// Prints a statistics report to stdout
pub fn print_statistics(report: &StatisticsReport) {
    println!("=== Crawl Statistics ===\n");
    println!("{}", report);
}

/// Prints a catalog summary to stdout
pub fn print_summary(summary: &CatalogSummary) {
    println!("=== Catalog Summary ===\n");
    println!("{}", summary);
}
