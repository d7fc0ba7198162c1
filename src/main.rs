//! AppImage-Ripple main entry point
//!
//! This is the command-line interface for the AppImage-Ripple artifact harvester.

use anyhow::Context;
use appimage_ripple::config::{load_config_with_hash, validate, Config};
use appimage_ripple::crawler::{Coordinator, RunOptions};
use appimage_ripple::output::{print_statistics, print_summary, summarize_catalog};
use appimage_ripple::storage::{open_storage, CatalogStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// AppImage-Ripple: a release artifact harvester
///
/// AppImage-Ripple downloads the application catalog, follows each package's
/// download page a bounded number of hops and records the Linux, Windows and
/// macOS artifacts it finds back into a local JSON snapshot.
#[derive(Parser, Debug)]
#[command(name = "appimage-ripple")]
#[command(version)]
#[command(about = "A release artifact harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file to read and write
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Continue from the existing snapshot instead of downloading the feed
    #[arg(long = "continue")]
    resume: bool,

    /// Stop after this many packages have been crawled (0 = no limit)
    #[arg(long, value_name = "N")]
    max_loops: Option<u64>,

    /// Number of HTML hops to follow from each download page
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Summarize the existing snapshot and exit
    #[arg(long, conflicts_with_all = ["resume", "max_loops", "depth"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, cli.resume).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("appimage_ripple=info,warn"),
            1 => EnvFilter::new("appimage_ripple=debug,info"),
            2 => EnvFilter::new("appimage_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(db) = &cli.db {
        config.catalog.snapshot_path = db.clone();
    }
    if let Some(max_loops) = cli.max_loops {
        config.catalog.max_loops = max_loops;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }

    validate(&config).context("invalid command-line override")?;
    Ok(config)
}

/// Handles the --stats mode: summarizes the snapshot without touching the network
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(&config.catalog.snapshot_path);
    println!("Snapshot: {}\n", store.describe());

    let packages = store
        .load()
        .with_context(|| format!("failed to read snapshot {}", store.describe()))?;
    print_summary(&summarize_catalog(&packages));

    Ok(())
}

/// Handles the main crawl operation
///
/// The statistics report is printed whether or not the run succeeds.
async fn handle_crawl(config: Config, resume: bool) -> anyhow::Result<()> {
    if resume {
        tracing::info!("Continuing from {}", config.catalog.snapshot_path.display());
    } else {
        tracing::info!("Starting fresh run from {}", config.catalog.feed_url);
    }

    let options = RunOptions::from_config(&config, resume);
    let store = open_storage(&config.catalog.snapshot_path);
    let mut coordinator =
        Coordinator::new(config, options, store).context("failed to set up the crawler")?;

    let ctx = Arc::clone(coordinator.context());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight requests and saving the catalog");
            ctx.budget.stop();
        }
    });

    let outcome = coordinator.run().await;
    print_statistics(&coordinator.report());

    match outcome {
        Ok(packages) => {
            tracing::info!("Run completed: {} packages in catalog", packages.len());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e).context("catalog run failed")
        }
    }
}
