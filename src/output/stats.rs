//! Run statistics
//!
//! This module tracks what happened during one harvest run and prints the
//! final report.

use crate::crawler::PageExtraction;
use std::path::PathBuf;
use std::time::Duration;

/// A page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    /// 1-based page number
    pub page: u32,

    pub url: String,

    /// Error description
    pub error: String,
}

/// Exit status of a run in which every page was fetched
pub const EXIT_COMPLETE: u8 = 0;

/// Exit status when the run finished but some pages were skipped
pub const EXIT_PARTIAL: u8 = 2;

/// How a finished run went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every page was fetched
    Complete,

    /// The run finished but some pages were skipped after fetch errors
    Partial,
}

/// Counters for one harvest run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Pages the run was asked to walk
    pub pages_requested: u32,

    /// Pages fetched successfully, including pages without ads
    pub pages_fetched: u32,

    /// Fetched pages on which the container selector matched nothing
    pub empty_pages: u32,

    pub failed_pages: Vec<FailedPage>,

    pub ads_written: u64,

    pub promoted_skipped: u64,

    pub malformed_skipped: u64,

    /// Output file, when the sink is file-backed
    pub output_path: Option<PathBuf>,

    pub elapsed: Duration,
}

impl RunOutcome {
    /// Process exit status reported for this outcome
    pub fn exit_status(self) -> u8 {
        match self {
            RunOutcome::Complete => EXIT_COMPLETE,
            RunOutcome::Partial => EXIT_PARTIAL,
        }
    }
}

impl RunSummary {
    /// Creates an empty summary for a run over `pages_requested` pages
    pub fn new(pages_requested: u32) -> Self {
        Self {
            pages_requested,
            ..Self::default()
        }
    }

    /// Records a fetched page and what its extraction produced
    ///
    /// `ads_written` is tracked separately, as rows actually reach the sink.
    pub fn record_page(&mut self, extraction: &PageExtraction) {
        self.pages_fetched += 1;
        if extraction.fragments_seen() == 0 {
            self.empty_pages += 1;
        }
        self.promoted_skipped += extraction.promoted_skipped as u64;
        self.malformed_skipped += extraction.malformed_skipped as u64;
    }

    /// Records a page skipped after a fetch error
    pub fn record_failed_page(&mut self, page: u32, url: &str, error: &str) {
        self.failed_pages.push(FailedPage {
            page,
            url: url.to_string(),
            error: error.to_string(),
        });
    }

    pub fn pages_failed(&self) -> u32 {
        self.failed_pages.len() as u32
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.failed_pages.is_empty() {
            RunOutcome::Complete
        } else {
            RunOutcome::Partial
        }
    }
}

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `summary` - The finished run's counters
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Pages:");
    println!("  Requested: {}", summary.pages_requested);
    println!("  Fetched: {}", summary.pages_fetched);
    println!("  Without ads: {}", summary.empty_pages);
    println!("  Failed: {}", summary.pages_failed());
    println!();

    println!("Ads:");
    println!("  Written: {}", summary.ads_written);
    println!("  Promoted (skipped): {}", summary.promoted_skipped);
    println!("  Malformed (skipped): {}", summary.malformed_skipped);
    println!();

    if !summary.failed_pages.is_empty() {
        println!("Failed Pages ({}):", summary.failed_pages.len());
        for failed in &summary.failed_pages {
            println!("  - page {}: {}", failed.page, failed.error);
        }
        println!();
    }

    if let Some(path) = &summary.output_path {
        println!("Output: {}", path.display());
    }

    println!(
        "Finished in {:.1}s ({})",
        summary.elapsed.as_secs_f64(),
        match summary.outcome() {
            RunOutcome::Complete => "complete",
            RunOutcome::Partial => "partial: some pages were skipped",
        }
    );
}
