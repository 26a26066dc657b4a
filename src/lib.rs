//! Ad-Harvester: a paginated classified-ads scraper
//!
//! This crate walks the result pages of a classified-ads listing site, extracts
//! the non-promoted ads on each page, and appends them one row at a time to a
//! CSV file that is synced to disk after every row.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Ad-Harvester operations
///
/// Only fatal conditions end up here. Page fetch failures and malformed ad
/// fragments are recovered inside the crawl loop and never abort a run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid CSS selector for {field}: '{selector}'")]
    InvalidSelector { field: String, selector: String },
}

/// Errors in the run inputs (start URL, page count, delay)
///
/// These are detected before any network activity takes place.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },

    #[error("Page count must be a positive integer, got {0}")]
    InvalidPageCount(u32),

    #[error("Delay must be a non-negative number of seconds, got {0}")]
    InvalidDelay(f64),
}

/// Result type alias for Ad-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{normalize_location, AdExtractor, AdRecord};
pub use output::{CsvSink, RecordSink, RunSummary};
pub use url::page_urls;
