//! Sitemap Harvest main entry point
//!
//! This is the command-line interface for the Sitemap Harvest site crawler.

use anyhow::Context;
use clap::Parser;
use sitemap_harvest::config::{load_config_with_hash, validate, Config, OutputFormat};
use sitemap_harvest::crawler::build_http_client;
use sitemap_harvest::driver::{CrawlSelection, RunDriver};
use sitemap_harvest::sitemap::SitemapResolver;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Placeholder used when no site address is given
const DEFAULT_SITE: &str = "your_website_url";

/// Sitemap Harvest: a sitemap-driven site crawler
///
/// Discovers every page a site lists in its sitemap (following sitemap
/// indexes and the robots.txt `Sitemap:` directive), then fetches and stores
/// each page with bounded concurrency and per-URL retries.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A sitemap-driven site crawler", long_about = None)]
struct Cli {
    /// Site address or sitemap URL to harvest
    #[arg(value_name = "SITE", default_value = DEFAULT_SITE)]
    site: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages fetched at the same time
    #[arg(long, value_name = "N")]
    max_concurrent: Option<u32>,

    /// Total fetch attempts per page
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Crawl only the first N discovered URLs
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Where crawled pages are stored
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for crawled content
    #[arg(long, value_name = "DIR")]
    content_dir: Option<String>,

    /// Directory for run logs
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Skip discovered URLs that robots.txt disallows
    #[arg(long)]
    respect_robots: bool,

    /// Resolve the sitemap and report what would be crawled, without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    let selection = match cli.limit {
        Some(n) => CrawlSelection::Limit(n),
        None => CrawlSelection::All,
    };

    if cli.dry_run {
        return handle_dry_run(&config, &cli.site, selection).await;
    }

    handle_crawl(&config, config_hash, &cli.site, selection).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
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

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(n) = cli.max_concurrent {
        config.crawler.max_concurrent = n;
    }
    if let Some(n) = cli.max_retries {
        config.crawler.max_retries = n;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(dir) = &cli.content_dir {
        config.output.content_dir = dir.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.output.log_dir = dir.clone();
    }
    if cli.respect_robots {
        config.sitemap.respect_robots = true;
    }
}

/// Handles the --dry-run mode: resolves the sitemap and reports the plan
async fn handle_dry_run(
    config: &Config,
    site: &str,
    selection: CrawlSelection,
) -> anyhow::Result<()> {
    println!("=== Sitemap Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max concurrent: {}", config.crawler.max_concurrent);
    println!("  Max attempts per URL: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Max sitemap depth: {}", config.sitemap.max_depth);
    println!("  Respect robots.txt: {}", config.sitemap.respect_robots);

    let client = build_http_client(&config.http)?;
    let resolver = SitemapResolver::from_config(client, &config.sitemap);
    let resolution = resolver.resolve(site).await;

    println!("\nSitemap: {}", resolution.sitemap_url);
    if resolution.is_empty() {
        println!("No sitemap URLs found; would crawl {} only", resolution.base_url);
        return Ok(());
    }

    let discovered = resolution.urls.len();
    let (targets, decision) = selection.apply(resolution.urls);
    println!("Discovered URLs: {}", discovered);
    println!("{}", decision.describe(&resolution.base_url));
    for url in targets.iter().take(20) {
        println!("  - {}", url);
    }
    if targets.len() > 20 {
        println!("  ... and {} more", targets.len() - 20);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: Option<String>,
    site: &str,
    selection: CrawlSelection,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut driver = RunDriver::from_config(config)
        .context("failed to set up the crawl")?
        .with_cancellation(cancel);
    if let Some(hash) = config_hash {
        driver = driver.with_config_hash(hash);
    }

    let report = driver.run(site, selection).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    if report.statistics.cancelled > 0 {
        tracing::warn!(
            "Run interrupted: {} URLs were not crawled",
            report.statistics.cancelled
        );
    }

    Ok(())
}

/// Cancels the run on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages and stopping");
            cancel.cancel();
        }
    });
}
