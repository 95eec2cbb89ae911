//! Magazine Harvester main entry point
//!
//! This is the command-line interface for the magazine article scraper.

use anyhow::{bail, Context};
use clap::Parser;
use magazine_harvester::config::{load_config, validate, Config, ExportFormat};
use magazine_harvester::output::export_records;
use magazine_harvester::{ScrapeContext, ScrapeOrchestrator};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Magazine Harvester: a rate-limited magazine page scraper
///
/// Fetches magazine pages concurrently under a shared request rate and an
/// overall deadline, extracts article titles, links and summaries, and
/// exports them to CSV or SQLite.
#[derive(Parser, Debug)]
#[command(name = "magazine-harvester")]
#[command(version)]
#[command(about = "A rate-limited magazine article scraper", long_about = None)]
struct Cli {
    /// Comma-separated list of magazine page URLs
    #[arg(long, value_delimiter = ',', required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Output path without extension
    #[arg(short, long, value_name = "BASE")]
    output: Option<String>,

    /// Maximum number of concurrent fetches
    #[arg(long)]
    concurrent: Option<usize>,

    /// Maximum requests per second across all fetches
    #[arg(long)]
    rate_limit: Option<f64>,

    /// Overall timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

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

    let config = build_config(&cli)?;
    let urls: Vec<String> = cli
        .urls
        .iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    let orchestrator =
        ScrapeOrchestrator::from_config(&config).context("Failed to set up scraper")?;

    let shutdown = CancellationToken::new();
    spawn_interrupt_handler(shutdown.clone());
    let ctx = ScrapeContext::from_token(shutdown);

    let outcome = orchestrator.scrape_urls(&ctx, &urls).await;

    if let Some(error) = &outcome.error {
        if outcome.records.is_empty() {
            tracing::error!("Scrape failed: {}", error);
        } else {
            tracing::warn!("Some pages could not be scraped: {}", error);
        }
    }

    if outcome.records.is_empty() {
        bail!("No articles were scraped");
    }

    println!("Scraped {} articles", outcome.records.len());

    let path = export_records(&config.output, &outcome.records)
        .context("Failed to export articles")?;
    println!("✓ Articles exported to: {}", path.display());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("magazine_harvester=info,warn"),
            1 => EnvFilter::new("magazine_harvester=debug,info"),
            2 => EnvFilter::new("magazine_harvester=trace,debug"),
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

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(concurrent) = cli.concurrent {
        config.scraper.max_concurrency = concurrent;
    }
    if let Some(rate_limit) = cli.rate_limit {
        config.scraper.max_requests_per_second = rate_limit;
    }
    if let Some(timeout) = cli.timeout {
        config.scraper.overall_timeout = Duration::from_secs(timeout);
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Cancels `shutdown` on Ctrl-C so in-flight fetches stop and partial results are kept
fn spawn_interrupt_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling scrape");
                shutdown.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
        }
    });
}
