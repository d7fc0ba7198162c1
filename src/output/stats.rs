//! Run statistics
//!
//! Counters are updated from every crawl task while a run is in progress and
//! read once at the end (or whenever a report is requested).

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one run
#[derive(Debug)]
pub struct CrawlStatistics {
    packages: AtomicU64,
    artifacts_found: AtomicU64,
    packages_with_artifacts: AtomicU64,
    fetch_failures: AtomicU64,
    started_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Creates zeroed counters; the run clock starts now
    pub fn new() -> Self {
        Self {
            packages: AtomicU64::new(0),
            artifacts_found: AtomicU64::new(0),
            packages_with_artifacts: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn set_packages(&self, total: u64) {
        self.packages.store(total, Ordering::Relaxed);
    }

    pub fn record_artifact(&self) {
        self.artifacts_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_package_with_artifacts(&self) {
        self.packages_with_artifacts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn packages(&self) -> u64 {
        self.packages.load(Ordering::Relaxed)
    }

    pub fn artifacts_found(&self) -> u64 {
        self.artifacts_found.load(Ordering::Relaxed)
    }

    pub fn packages_with_artifacts(&self) -> u64 {
        self.packages_with_artifacts.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a printable report
    ///
    /// # Arguments
    ///
    /// * `crawled_urls` - Size of the run's visited set
    pub fn report(&self, crawled_urls: usize) -> StatisticsReport {
        StatisticsReport {
            packages: self.packages(),
            crawled_urls: crawled_urls as u64,
            artifacts_found: self.artifacts_found(),
            packages_with_artifacts: self.packages_with_artifacts(),
            fetch_failures: self.fetch_failures(),
            elapsed: Utc::now() - self.started_at,
        }
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsReport {
    pub packages: u64,
    pub crawled_urls: u64,
    pub artifacts_found: u64,
    pub packages_with_artifacts: u64,
    pub fetch_failures: u64,
    pub elapsed: chrono::Duration,
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.num_seconds().max(0);
        writeln!(f, "Total packages:                      {}", self.packages)?;
        writeln!(f, "Crawled URLs:                        {}", self.crawled_urls)?;
        writeln!(f, "Artifacts found:                     {}", self.artifacts_found)?;
        writeln!(
            f,
            "Packages with at least one artifact: {}",
            self.packages_with_artifacts
        )?;
        writeln!(f, "Fetch failures:                      {}", self.fetch_failures)?;
        write!(
            f,
            "Time elapsed:                        {}h {:02}m {:02}s",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}
