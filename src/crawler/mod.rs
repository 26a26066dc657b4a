//! Crawler module for result page fetching and ad extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of result pages
//! - Ad fragment parsing and field extraction
//! - The sequential page loop

mod coordinator;
mod extractor;
mod fetcher;

pub use coordinator::{run_harvest, Coordinator};
pub use extractor::{
    compile_selector, is_promoted, normalize_location, normalize_location_with, AdExtractor,
    AdRecord, Fragment, LocationKeep, PageExtraction, ParseError, DEFAULT_LOCATION_SEPARATOR,
};
pub use fetcher::{build_http_client, fetch_page, FetchError};
