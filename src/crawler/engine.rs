//! Crawl engine
//!
//! Depth-bounded traversal of the link graph below one package's download
//! page. The traversal runs off an explicit work-list of `(url, depth)`
//! items processed depth-first in document order. A URL is claimed in the
//! run-wide visited set when it is enqueued, so it is fetched at most once
//! per run no matter how many pages (or packages) link to it.

use crate::catalog::Artifact;
use crate::crawler::classifier::ArtifactClassifier;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_html;
use crate::output::CrawlStatistics;
use crate::state::{RunBudget, VisitedSet};
use crate::url::canonical_seed;
use url::Url;

/// Everything a crawl shares with the rest of the run
///
/// One context exists per run; it is handed to every package crawl.
#[derive(Debug)]
pub struct RunContext {
    pub fetcher: Fetcher,
    pub classifier: ArtifactClassifier,
    pub visited: VisitedSet,
    pub stats: CrawlStatistics,
    pub budget: RunBudget,
}

impl RunContext {
    pub fn new(fetcher: Fetcher, classifier: ArtifactClassifier, budget: RunBudget) -> Self {
        Self {
            fetcher,
            classifier,
            visited: VisitedSet::new(),
            stats: CrawlStatistics::new(),
            budget,
        }
    }
}

/// A pending traversal step
#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkItem {
    url: String,
    /// HTML hops this page may still expand
    depth: u32,
}

/// Result of one package crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Artifacts found below the seed, in discovery order
    pub artifacts: Vec<Artifact>,

    /// False when the run budget ran out before the work-list was drained;
    /// `artifacts` is then only part of what the seed leads to
    pub complete: bool,
}

impl CrawlOutcome {
    fn finished(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts,
            complete: true,
        }
    }
}

/// Crawls from `seed`, returning the artifacts found below it
///
/// # Algorithm
///
/// 1. An unusable or already visited seed yields an empty, complete outcome
/// 2. Each item is probed with HEAD; failures are logged, counted and skipped
/// 3. HTML with remaining depth is fetched and its anchors are enqueued with
///    `depth - 1`; HTML at depth 0 is a leaf
/// 4. Anything else goes through the classifier; new artifacts are appended
///
/// The run budget is checked before every item. A stopped run returns
/// promptly with `complete == false` and whatever was found so far.
///
/// # Arguments
///
/// * `ctx` - The run context (visited set, statistics, fetcher, classifier)
/// * `seed` - Absolute URL of the package's download page
/// * `depth` - HTML hops to follow from the seed
pub async fn crawl_package(ctx: &RunContext, seed: &str, depth: u32) -> CrawlOutcome {
    let seed = match canonical_seed(seed) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::debug!("Seed {:?} is not crawlable: {}", seed, e);
            return CrawlOutcome::finished(Vec::new());
        }
    };

    if !ctx.visited.insert_if_absent(&seed) {
        tracing::debug!("Seed {} already visited in this run", seed);
        return CrawlOutcome::finished(Vec::new());
    }

    let mut artifacts: Vec<Artifact> = Vec::new();
    let mut work = vec![WorkItem { url: seed, depth }];

    while let Some(item) = work.pop() {
        if ctx.budget.is_exhausted() {
            tracing::info!(
                "Run budget exhausted, abandoning {} pending URL(s)",
                work.len() + 1
            );
            return CrawlOutcome {
                artifacts,
                complete: false,
            };
        }

        let children = process_item(ctx, &item, &mut artifacts).await;

        // Reverse so the first link on the page is popped first.
        for url in children.into_iter().rev() {
            if ctx.visited.insert_if_absent(&url) {
                work.push(WorkItem {
                    url,
                    depth: item.depth.saturating_sub(1),
                });
            } else {
                tracing::trace!("Already visited: {}", url);
            }
        }
    }

    CrawlOutcome::finished(artifacts)
}

/// Probes one URL and returns the links to follow from it
async fn process_item(
    ctx: &RunContext,
    item: &WorkItem,
    artifacts: &mut Vec<Artifact>,
) -> Vec<String> {
    tracing::debug!("Probing {} (depth {})", item.url, item.depth);

    let probe = match ctx.fetcher.probe(&item.url).await {
        Ok(probe) => probe,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", item.url, e);
            ctx.stats.record_fetch_failure();
            return Vec::new();
        }
    };

    if probe.final_url != item.url && !ctx.visited.insert_if_absent(&probe.final_url) {
        tracing::debug!(
            "{} redirects to already visited {}",
            item.url,
            probe.final_url
        );
        return Vec::new();
    }

    if !probe.is_html() {
        if let Some(artifact) = ctx.classifier.classify(&item.url, &probe.headers) {
            if !artifacts.contains(&artifact) {
                tracing::info!("Found {} artifact: {}", artifact.os, artifact.url);
                ctx.stats.record_artifact();
                artifacts.push(artifact);
            }
        } else {
            tracing::trace!(
                "Not an artifact: {} ({})",
                item.url,
                probe.content_type().unwrap_or("no content type")
            );
        }
        return Vec::new();
    }

    if item.depth == 0 {
        tracing::trace!("Depth exhausted at {}", item.url);
        return Vec::new();
    }

    let page = match ctx.fetcher.fetch_body(&item.url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Could not read page {}: {}", item.url, e);
            ctx.stats.record_fetch_failure();
            return Vec::new();
        }
    };

    let base = match Url::parse(&page.final_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("Unusable page URL {}: {}", page.final_url, e);
            return Vec::new();
        }
    };

    let parsed = parse_html(&page.body, &base);
    tracing::info!(
        "Crawled {} ({} links{})",
        item.url,
        parsed.links.len(),
        parsed
            .title
            .as_deref()
            .map(|t| format!(", \"{}\"", t))
            .unwrap_or_default()
    );

    parsed.links
}
