//! Catalog coordinator - per-package crawl orchestration
//!
//! This module drives one crawl per catalog package:
//! - Loading the catalog (fresh from the feed, or from the snapshot on resume)
//! - Selecting each package's seed and skipping already crawled packages
//! - Running up to `max_concurrent_packages` crawls at once
//! - Merging artifacts and checkpointing the catalog after every package
//! - Enforcing the run-length and time limits

use crate::catalog::{fetch_feed, Package};
use crate::config::Config;
use crate::crawler::classifier::ArtifactClassifier;
use crate::crawler::engine::{crawl_package, CrawlOutcome, RunContext};
use crate::crawler::fetcher::Fetcher;
use crate::output::StatisticsReport;
use crate::state::RunBudget;
use crate::storage::{CatalogStore, JsonFileStore};
use crate::url::canonical_seed;
use crate::RippleError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Run controls chosen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Continue a previous run from the snapshot instead of downloading the feed
    pub resume: bool,

    /// HTML hops followed from each seed
    pub max_depth: u32,

    /// Packages crawled before stopping; 0 means no limit
    pub max_loops: u64,

    /// Checkpoint after every package (otherwise only at the end)
    pub save_often: bool,

    /// Packages crawled concurrently
    pub max_concurrent_packages: usize,

    /// Wall-clock limit for the run
    pub max_run_time: Option<Duration>,
}

impl RunOptions {
    /// Derives the run controls from configuration
    pub fn from_config(config: &Config, resume: bool) -> Self {
        Self {
            resume,
            max_depth: config.crawler.max_depth,
            max_loops: config.catalog.max_loops,
            save_often: config.catalog.save_often,
            max_concurrent_packages: config.crawler.max_concurrent_packages.max(1) as usize,
            max_run_time: (config.catalog.max_run_secs > 0)
                .then(|| Duration::from_secs(config.catalog.max_run_secs)),
        }
    }
}

/// Why a package was not crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NoDownloadLink,
    UnusableSeed,
    AlreadyCrawled,
}

/// Main catalog coordinator structure
pub struct Coordinator<S: CatalogStore> {
    config: Arc<Config>,
    options: RunOptions,
    store: S,
    context: Arc<RunContext>,
}

impl<S: CatalogStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `options` - Run controls
    /// * `store` - Where the catalog is read from and checkpointed to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RippleError)` - The HTTP client could not be built
    pub fn new(config: Config, options: RunOptions, store: S) -> Result<Self, RippleError> {
        let fetcher = Fetcher::from_config(&config.user_agent, &config.crawler)?;
        let classifier = ArtifactClassifier::new(config.crawler.artifact_hosts.clone());
        let budget = RunBudget::new(options.max_loops, options.max_run_time);

        Ok(Self {
            config: Arc::new(config),
            options,
            store,
            context: Arc::new(RunContext::new(fetcher, classifier, budget)),
        })
    }

    /// The shared run context (visited set, statistics, budget)
    ///
    /// Stopping its budget from another task winds the run down: no new
    /// packages start and interrupted ones are left unmodified.
    pub fn context(&self) -> &Arc<RunContext> {
        &self.context
    }

    /// Current statistics, available even after a failed run
    pub fn report(&self) -> StatisticsReport {
        self.context.stats.report(self.context.visited.len())
    }

    /// Loads the catalog and crawls it
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Package>)` - The final catalog, as written to the store
    /// * `Err(RippleError)` - Catalog could not be loaded, or a checkpoint failed
    pub async fn run(&mut self) -> Result<Vec<Package>, RippleError> {
        let packages = self.load_catalog().await?;
        self.crawl_catalog(packages).await
    }

    /// Obtains the catalog to work on
    ///
    /// On resume the snapshot must exist; a fresh run downloads the feed and
    /// writes it out as the first snapshot before anything is crawled.
    pub async fn load_catalog(&mut self) -> Result<Vec<Package>, RippleError> {
        if self.options.resume {
            tracing::info!("Resuming from snapshot {}", self.store.describe());
            let packages = self.store.load()?;
            tracing::info!("Snapshot holds {} packages", packages.len());
            return Ok(packages);
        }

        let packages =
            fetch_feed(self.context.fetcher.client(), &self.config.catalog.feed_url).await?;
        self.store.save(&packages)?;
        Ok(packages)
    }

    /// Crawls every eligible package of `packages`
    ///
    /// Artifacts are merged into the packages as their crawls complete and
    /// the catalog is checkpointed after each one when `save_often` is set.
    /// A final checkpoint is always written. A failed checkpoint stops the
    /// run immediately.
    pub async fn crawl_catalog(
        &mut self,
        mut packages: Vec<Package>,
    ) -> Result<Vec<Package>, RippleError> {
        self.context.stats.set_packages(packages.len() as u64);

        let mut pending = Vec::new();
        for (index, package) in packages.iter().enumerate() {
            match self.select_seed(package) {
                Ok(seed) => pending.push((index, seed)),
                Err(reason) => {
                    tracing::debug!("Skipping package {}: {:?}", package.name, reason)
                }
            }
        }

        tracing::info!(
            "{} of {} packages to crawl (depth {}, {} at a time)",
            pending.len(),
            packages.len(),
            self.options.max_depth,
            self.options.max_concurrent_packages
        );

        let mut pending = pending.into_iter();
        let mut in_flight: JoinSet<(usize, CrawlOutcome)> = JoinSet::new();

        loop {
            while in_flight.len() < self.options.max_concurrent_packages {
                let budget = &self.context.budget;
                if budget.is_exhausted() || budget.packages_exhausted() {
                    break;
                }

                let Some((index, seed)) = pending.next() else {
                    break;
                };

                if !budget.try_start_package() {
                    break;
                }

                tracing::info!("Package {}: crawling {}", packages[index].name, seed);
                let ctx = Arc::clone(&self.context);
                let depth = self.options.max_depth;
                in_flight.spawn(async move {
                    let outcome = crawl_package(&ctx, &seed, depth).await;
                    (index, outcome)
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (index, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Crawl task failed: {}", e);
                    continue;
                }
            };

            let package = &mut packages[index];
            if !outcome.complete {
                // Left as it was so a resumed run crawls it again from scratch.
                tracing::info!(
                    "Package {}: crawl interrupted, {} artifact(s) discarded",
                    package.name,
                    outcome.artifacts.len()
                );
                continue;
            }

            let added = package.merge_artifacts(outcome.artifacts);
            if added > 0 {
                self.context.stats.record_package_with_artifacts();
            }
            tracing::info!(
                "Package {}: {} new artifact(s), {} total",
                package.name,
                added,
                package.artifacts().len()
            );

            if self.options.save_often {
                if let Err(e) = self.store.save(&packages) {
                    tracing::error!("Checkpoint to {} failed: {}", self.store.describe(), e);
                    self.context.budget.stop();
                    in_flight.abort_all();
                    return Err(e.into());
                }
            }
        }

        if self.context.budget.packages_exhausted() {
            tracing::info!(
                "Stopped after {} package(s) (max-loops reached)",
                self.context.budget.packages_started()
            );
        } else if self.context.budget.is_exhausted() {
            tracing::info!("Run stopped before all packages were crawled");
        }

        self.store.save(&packages)?;
        tracing::info!("Catalog saved to {}", self.store.describe());
        Ok(packages)
    }

    fn select_seed(&self, package: &Package) -> Result<String, SkipReason> {
        let seed = package.seed_url().ok_or(SkipReason::NoDownloadLink)?;

        let seed = canonical_seed(seed).map_err(|e| {
            tracing::debug!("Package {} has an unusable seed {:?}: {}", package.name, seed, e);
            SkipReason::UnusableSeed
        })?;

        if self.options.resume && package.has_artifacts() {
            return Err(SkipReason::AlreadyCrawled);
        }

        Ok(seed)
    }
}

/// Runs a complete catalog crawl against the configured snapshot file
///
/// # Example
///
/// ```no_run
/// use appimage_ripple::config::Config;
/// use appimage_ripple::crawler::run_catalog;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_catalog(Config::default(), false).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn run_catalog(config: Config, resume: bool) -> Result<StatisticsReport, RippleError> {
    let options = RunOptions::from_config(&config, resume);
    let store = JsonFileStore::new(config.catalog.snapshot_path.clone());
    let mut coordinator = Coordinator::new(config, options, store)?;
    coordinator.run().await?;
    Ok(coordinator.report())
}
