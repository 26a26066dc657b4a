//! URL handling module for Ad-Harvester
//!
//! This module provides start URL parsing, page URL generation for paginated
//! result listings, and resolution of ad links to absolute URLs.

mod paginate;
mod resolve;

// Re-export main functions
pub use paginate::{
    category_from_url, page_url, page_urls, page_urls_with_param, parse_start_url, PageUrls,
    DEFAULT_PAGE_PARAM,
};
pub use resolve::resolve_link;
