//! Harvest coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that ties the pieces together:
//! - Generating page URLs from the start URL
//! - Fetching each page in order
//! - Extracting ad records
//! - Appending records to the sink
//! - Pausing between pages
//!
//! Pages are processed strictly one after another. A page that fails to fetch
//! is logged and skipped; a sink failure ends the run.

use crate::config::{validate, Config, CrawlConfig};
use crate::crawler::extractor::AdExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::output::{output_prefix, CsvSink, RecordSink, RunSummary};
use crate::url::{page_urls_with_param, parse_start_url};
use crate::HarvestError;
use chrono::NaiveDateTime;
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Everything a run needs apart from the sink
///
/// Built before the sink so that a failure here never leaves an output file
/// behind.
struct RunParts {
    crawl: CrawlConfig,
    start_url: Url,
    client: Client,
    extractor: AdExtractor,
}

impl RunParts {
    fn build(config: &Config) -> Result<Self, HarvestError> {
        validate(config)?;

        Ok(Self {
            crawl: config.crawl.clone(),
            start_url: parse_start_url(&config.crawl.start_url)?,
            client: build_http_client(&config.http)?,
            extractor: AdExtractor::new(&config.selectors)?,
        })
    }
}

/// Main harvest coordinator structure
pub struct Coordinator<S: RecordSink> {
    crawl: CrawlConfig,
    start_url: Url,
    client: Client,
    extractor: AdExtractor,
    sink: S,
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration before anything touches the network.
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `sink` - Where accepted records are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid input or configuration
    pub fn new(config: &Config, sink: S) -> Result<Self, HarvestError> {
        Ok(Self::from_parts(RunParts::build(config)?, sink))
    }

    fn from_parts(parts: RunParts, sink: S) -> Self {
        Self {
            crawl: parts.crawl,
            start_url: parts.start_url,
            client: parts.client,
            extractor: parts.extractor,
            sink,
        }
    }

    /// Runs the page loop
    ///
    /// For each page 1..=N:
    /// 1. Fetch the page; on error log it, record it and move on
    /// 2. Extract records, skipping promoted and malformed fragments
    /// 3. Append every record to the sink, each one durable before the next
    /// 4. Sleep for the configured delay unless this was the last page
    ///
    /// Appending is synchronous, so a cancelled run future always stops
    /// between rows, never inside one.
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        let pages = page_urls_with_param(
            &self.start_url,
            &self.crawl.page_param,
            self.crawl.page_count,
        )?;
        let total = pages.page_count();
        let delay = Duration::from_secs_f64(self.crawl.delay_seconds);

        let mut summary = RunSummary::new(total);
        let start_time = Instant::now();

        tracing::info!("Harvesting {} page(s) from {}", total, self.start_url);

        for (page, url) in pages {
            tracing::debug!("Fetching page {}/{}: {}", page, total, url);

            match fetch_page(&self.client, &url).await {
                Ok(body) => {
                    let extraction = self.extractor.extract_page(&body, &url);
                    summary.record_page(&extraction);

                    for record in &extraction.records {
                        self.sink.append(record)?;
                        summary.ads_written += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping page {} ({}): {}", page, url, e);
                    summary.record_failed_page(page, url.as_str(), &e.to_string());
                }
            }

            tracing::info!(
                "Progress: page {}/{} done, {} ads written",
                page,
                total,
                summary.ads_written
            );

            if page < total && !delay.is_zero() {
                tracing::debug!("Waiting {:?} before next page", delay);
                tokio::time::sleep(delay).await;
            }
        }

        summary.elapsed = start_time.elapsed();
        summary.output_path = self.sink.path().map(Path::to_path_buf);

        tracing::info!(
            "Harvest finished: {} ads from {}/{} pages in {:?}",
            summary.ads_written,
            summary.pages_fetched,
            total,
            summary.elapsed
        );

        Ok(summary)
    }

    /// The sink records are written to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the coordinator, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Runs a complete harvest into a new CSV file
///
/// This function orchestrates the whole run:
///
/// 1. Validate the configuration (no network or file activity on failure)
/// 2. Build the HTTP client and extractor
/// 3. Choose the output prefix and create `<prefix>_<timestamp>.csv`
/// 4. Walk the pages
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `started_at` - Local start time, used in the output file name
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished, possibly with skipped pages
/// * `Err(HarvestError)` - Input, configuration or output failure
///
/// # Example
///
/// ```no_run
/// use ad_harvester::config::Config;
/// use ad_harvester::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawl.start_url = "https://ikman.lk/en/ads/sri-lanka/mobile-phones".to_string();
/// config.crawl.page_count = 5;
///
/// let summary = run_harvest(config, chrono::Local::now().naive_local()).await?;
/// println!("{} ads written", summary.ads_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    started_at: NaiveDateTime,
) -> Result<RunSummary, HarvestError> {
    let parts = RunParts::build(&config)?;

    let prefix = output_prefix(&config, &parts.start_url);
    let sink = CsvSink::create(Path::new(&config.output.directory), &prefix, started_at)?;

    Coordinator::from_parts(parts, sink).run().await
}
