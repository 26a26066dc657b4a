//! Configuration module for Ad-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command-line flags are layered on top of the file by the binary before the
//! final [`validate`] call.
//!
//! # Example
//!
//! ```no_run
//! use ad_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pages to walk: {}", config.crawl.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, HttpConfig, OutputConfig, SelectorConfig, DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_crawl_config};
