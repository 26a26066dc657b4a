use crate::crawler::{LocationKeep, DEFAULT_LOCATION_SEPARATOR};
use serde::Deserialize;

/// Default browser User-Agent sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Main configuration structure for Ad-Harvester
///
/// Every section is optional in the TOML file; missing sections and keys take
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// What to crawl and how fast
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// First results page; search query and filters are carried as query parameters
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Number of result pages to walk, starting at page 1
    #[serde(rename = "page-count")]
    pub page_count: u32,

    /// Pause between finishing one page and requesting the next (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Name of the page-number query parameter
    #[serde(rename = "page-param")]
    pub page_param: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            page_count: 1,
            delay_seconds: 0.0,
            page_param: "page".to_string(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_seconds: 20,
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV file is created in
    pub directory: String,

    /// File name prefix; derived from the start URL's category when unset
    pub prefix: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            prefix: None,
        }
    }
}

/// Site markup selectors
///
/// These track the listing site's current CSS class names and are expected to
/// change over time, so they live in configuration rather than code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One match per ad fragment
    pub container: String,

    pub title: String,

    pub price: String,

    #[serde(rename = "time-listed")]
    pub time_listed: String,

    pub location: String,

    /// A fragment is promoted when it, or any ancestor, has a class starting with one of these
    #[serde(rename = "promoted-class-prefixes")]
    pub promoted_class_prefixes: Vec<String>,

    /// Separator between the category and the place in the location text
    #[serde(rename = "location-separator")]
    pub location_separator: String,

    /// Which side of the separator holds the place (`"first"` or `"last"`)
    #[serde(rename = "location-keep")]
    pub location_keep: LocationKeep,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "a.card-link--3ssYv.gtm-ad-item".to_string(),
            title: "h2.heading--2eONR".to_string(),
            price: "div.price--3SnqI".to_string(),
            time_listed: "div.updated-time--1DbCk".to_string(),
            location: "div.description--2-ez3".to_string(),
            promoted_class_prefixes: vec![
                "top-ads-container".to_string(),
                "featured-card".to_string(),
            ],
            location_separator: DEFAULT_LOCATION_SEPARATOR.to_string(),
            location_keep: LocationKeep::Last,
        }
    }
}
