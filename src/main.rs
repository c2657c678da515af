//! Folio-Harvest main entry point
//!
//! This is the command-line interface for the Folio-Harvest catalog crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_harvest::artifact::RemoteStore;
use folio_harvest::catalog::{open_catalog, Catalog};
use folio_harvest::config::{load_config_with_hash, Config};
use folio_harvest::crawler::{crawl, remote_from_config};
use folio_harvest::{CrawlResult, StorageTier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Folio-Harvest: a catalog ingestion crawler
///
/// Folio-Harvest reads a detail page, or a listing page of detail pages,
/// extracts catalog records and stores each record's document remotely or
/// locally.
#[derive(Parser, Debug)]
#[command(name = "folio-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A catalog ingestion crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a detail page or a listing page
    Crawl {
        /// Detail or listing page URL on the configured site
        url: String,

        /// Maximum number of detail pages processed from a listing page
        #[arg(long)]
        max_books: Option<u32>,

        /// Keep local copies of downloaded documents
        #[arg(long)]
        keep_local: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether remote storage is reachable
    Probe,

    /// Show catalog statistics and recent runs
    Stats {
        /// Number of recent runs to list
        #[arg(long, default_value_t = 5)]
        runs: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl {
            url,
            max_books,
            keep_local,
            json,
        } => {
            let max_books = max_books.unwrap_or(config.crawler.max_books);
            let result = crawl(config, &config_hash, &url, max_books, keep_local)
                .await
                .context("Failed to set up crawl")?;
            print_result(&result, json)?;
        }
        Command::Probe => handle_probe(&config).await?,
        Command::Stats { runs } => handle_stats(&config, runs)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_harvest=info,warn"),
            1 => EnvFilter::new("folio_harvest=debug,info"),
            2 => EnvFilter::new("folio_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: &CrawlResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("=== Crawl Result ===\n");
    println!("URL: {}", result.url);
    println!("Started: {}", result.start_time.to_rfc3339());
    println!("Finished: {}", result.end_time.to_rfc3339());
    println!("\n{}", result.summary());

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    Ok(())
}

async fn handle_probe(config: &Config) -> anyhow::Result<()> {
    let remote = remote_from_config(config).context("Failed to build remote client")?;
    let probe = remote.probe().await;

    println!(
        "Remote storage: {}",
        if probe.available { "available" } else { "unavailable" }
    );
    println!("  {}", probe.message);

    Ok(())
}

fn handle_stats(config: &Config, runs: usize) -> anyhow::Result<()> {
    let path = Path::new(&config.storage.database_path);
    if !path.exists() {
        println!("No catalog at {} yet", path.display());
        return Ok(());
    }

    let catalog = open_catalog(path).context("Failed to open catalog")?;
    let stats = catalog.stats()?;

    println!("=== Catalog Statistics ===\n");
    println!("Books: {}", stats.books);
    println!("Categories: {}", stats.categories);
    println!("Attachments:");
    println!("  Remote: {}", stats.attachments_in(StorageTier::Remote));
    println!("  Local: {}", stats.attachments_in(StorageTier::Local));
    println!("  None: {}", stats.without_attachment());
    println!("Crawl runs: {}", stats.runs);

    let recent = catalog.recent_runs(runs)?;
    if !recent.is_empty() {
        println!("\nRecent runs:");
        for run in recent {
            println!(
                "  {} {} - {} ok, {} failed, {} skipped ({} ms)",
                run.started_at.format("%Y-%m-%d %H:%M:%S"),
                run.url,
                run.success_count,
                run.failed_count,
                run.skipped_count,
                run.duration_ms
            );
        }
    }

    Ok(())
}
