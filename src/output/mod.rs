//! Output module for writing harvested ads and run reports
//!
//! This module handles:
//! - The record sink interface and its durable CSV implementation
//! - Output file naming
//! - Recording and printing run statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::{output_file_name, CsvSink, CSV_HEADER};
pub use stats::{
    print_summary, FailedPage, RunOutcome, RunSummary, EXIT_COMPLETE, EXIT_PARTIAL,
};
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::config::Config;
use crate::url::category_from_url;
use url::Url;

/// Prefix used when neither the config nor the start URL names a category
pub const FALLBACK_PREFIX: &str = "ads";

/// Chooses the output file prefix for a run
///
/// Priority order:
/// 1. `output.prefix` from the configuration
/// 2. The category in the start URL's last path segment
/// 3. [`FALLBACK_PREFIX`]
pub fn output_prefix(config: &Config, start_url: &Url) -> String {
    config
        .output
        .prefix
        .clone()
        .or_else(|| category_from_url(start_url))
        .unwrap_or_else(|| FALLBACK_PREFIX.to_string())
}
