//! Ad-Harvester main entry point
//!
//! This is the command-line interface for the Ad-Harvester listing scraper.

use ad_harvester::config::{load_config, validate, Config};
use ad_harvester::crawler::run_harvest;
use ad_harvester::output::{output_file_name, output_prefix, print_summary, RunOutcome};
use ad_harvester::url::{page_urls_with_param, parse_start_url};
use ad_harvester::HarvestError;
use chrono::Local;
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Ad-Harvester: a paginated classified-ads scraper
///
/// Walks the result pages of a listing, skips promoted ads, and writes title,
/// price, link, time listed and location of every other ad to a CSV file.
/// Each row is synced to disk as soon as it is written.
#[derive(Parser, Debug)]
#[command(name = "ad-harvester")]
#[command(version)]
#[command(about = "A paginated classified-ads scraper", long_about = None)]
struct Cli {
    /// First results page, with search filters as query parameters
    #[arg(value_name = "START_URL")]
    start_url: Option<String>,

    /// Number of pages to scrape, starting at page 1
    #[arg(short, long, value_name = "N")]
    pages: Option<u32>,

    /// Pause between pages, in seconds (fractions allowed)
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to write the CSV file into
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output file prefix (defaults to the category in the start URL)
    #[arg(long, value_name = "NAME")]
    prefix: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate inputs and list the pages that would be fetched, without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        return match handle_dry_run(&config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    handle_harvest(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ad_harvester=info,warn"),
            1 => EnvFilter::new("ad_harvester=debug,info"),
            2 => EnvFilter::new("ad_harvester=trace,debug"),
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

/// Loads the optional config file and layers command-line flags on top
fn build_config(cli: &Cli) -> Result<Config, HarvestError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(start_url) = &cli.start_url {
        config.crawl.start_url = start_url.clone();
    }
    if let Some(pages) = cli.pages {
        config.crawl.page_count = pages;
    }
    if let Some(delay) = cli.delay {
        config.crawl.delay_seconds = delay;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }
    if let Some(prefix) = &cli.prefix {
        config.output.prefix = Some(prefix.clone());
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be fetched and written
fn handle_dry_run(config: &Config) -> Result<(), HarvestError> {
    let start_url = parse_start_url(&config.crawl.start_url)?;
    let pages = page_urls_with_param(
        &start_url,
        &config.crawl.page_param,
        config.crawl.page_count,
    )?;

    println!("=== Ad-Harvester Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", start_url);
    println!("  Pages: {}", config.crawl.page_count);
    println!("  Delay between pages: {}s", config.crawl.delay_seconds);
    println!("  Request timeout: {}s", config.http.timeout_seconds);

    println!("\nSelectors:");
    println!("  Container: {}", config.selectors.container);
    println!("  Title: {}", config.selectors.title);
    println!("  Price: {}", config.selectors.price);
    println!("  Time listed: {}", config.selectors.time_listed);
    println!("  Location: {}", config.selectors.location);
    println!(
        "  Location: keep {:?} part around {:?}",
        config.selectors.location_keep, config.selectors.location_separator
    );
    println!(
        "  Promoted class prefixes: {}",
        config.selectors.promoted_class_prefixes.join(", ")
    );

    let file_name = output_file_name(
        &output_prefix(config, &start_url),
        &Local::now().naive_local(),
    );
    println!("\nOutput:");
    println!(
        "  {}",
        PathBuf::from(&config.output.directory).join(file_name).display()
    );

    println!("\nPage URLs:");
    for (page, url) in pages {
        println!("  {:>4}  {}", page, url);
    }

    println!("\n✓ Inputs are valid");
    Ok(())
}

/// Handles the main harvest operation
///
/// The run is raced against Ctrl-C. Rows already reported as written are on
/// disk, so an interrupted run leaves a valid partial file.
async fn handle_harvest(config: Config) -> ExitCode {
    let started_at = Local::now().naive_local();

    tokio::select! {
        result = run_harvest(config, started_at) => match result {
            Ok(summary) => {
                print_summary(&summary);
                let outcome = summary.outcome();
                if outcome == RunOutcome::Partial {
                    tracing::warn!(
                        "{} page(s) could not be fetched and were skipped",
                        summary.pages_failed()
                    );
                }
                ExitCode::from(outcome.exit_status())
            }
            Err(e) => {
                tracing::error!("Harvest failed: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = wait_for_interrupt(tokio::signal::ctrl_c()) => {
            tracing::warn!("Interrupted; rows written so far are saved");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

/// Resolves when `signal` reports an interrupt
///
/// If the handler cannot be installed this never resolves, so the run goes on
/// without interrupt support instead of stopping at once.
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
