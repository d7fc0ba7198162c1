//! Offline summary of a saved catalog snapshot

use crate::catalog::{Package, Platform};
use std::collections::BTreeMap;
use std::fmt;

/// Counts derived from a catalog, without touching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub packages: usize,
    pub with_seed: usize,
    pub crawled: usize,
    pub with_artifacts: usize,
    pub artifacts_by_platform: BTreeMap<Platform, usize>,
}

impl CatalogSummary {
    pub fn total_artifacts(&self) -> usize {
        self.artifacts_by_platform.values().sum()
    }
}

/// Summarizes a catalog
pub fn summarize_catalog(packages: &[Package]) -> CatalogSummary {
    let mut artifacts_by_platform: BTreeMap<Platform, usize> =
        Platform::ALL.iter().map(|p| (*p, 0)).collect();

    for package in packages {
        for platform in Platform::ALL {
            *artifacts_by_platform.entry(platform).or_default() +=
                package.artifacts_for(platform).count();
        }
    }

    CatalogSummary {
        packages: packages.len(),
        with_seed: packages.iter().filter(|p| p.seed_url().is_some()).count(),
        crawled: packages.iter().filter(|p| p.is_crawled()).count(),
        with_artifacts: packages.iter().filter(|p| p.has_artifacts()).count(),
        artifacts_by_platform,
    }
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Packages:                {}", self.packages)?;
        writeln!(f, "  with a download link:  {}", self.with_seed)?;
        writeln!(f, "  crawled:               {}", self.crawled)?;
        writeln!(f, "  with artifacts:        {}", self.with_artifacts)?;
        write!(f, "Artifacts:               {}", self.total_artifacts())?;
        for (platform, count) in &self.artifacts_by_platform {
            write!(f, "\n  {:<22} {}", format!("{}:", platform), count)?;
        }
        Ok(())
    }
}
