//! Ad field extraction
//!
//! This module turns one results page into structured ad records:
//! - Locating ad fragments with the container selector
//! - Skipping promoted ads
//! - Pulling title, price, link, time listed and location out of each fragment
//! - Normalizing the location text
//!
//! All selectors come from [`SelectorConfig`], so a markup change on the site
//! only needs a configuration update.

use crate::config::SelectorConfig;
use crate::url::resolve_link;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Separator between category and place in the site's location line
pub const DEFAULT_LOCATION_SEPARATOR: &str = "›";

/// Which side of the location separator holds the place
///
/// `Last` fits "Mobile Phones › Colombo"; `First` fits "Colombo, Mobile Phones".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKeep {
    First,
    #[default]
    Last,
}

/// One scraped, non-promoted listing
///
/// Field names are serialized as the CSV column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    #[serde(rename = "Title")]
    pub title: String,

    /// Price as displayed, e.g. "Rs 145,000" or "Negotiable"
    #[serde(rename = "Price")]
    pub price: String,

    /// Absolute URL of the ad page
    #[serde(rename = "Link")]
    pub link: String,

    /// Listing time as displayed, e.g. "5 hours ago"
    #[serde(rename = "Time Listed")]
    pub time_listed: String,

    /// Place with the category segment removed
    #[serde(rename = "Location")]
    pub location: String,
}

/// Why a single ad fragment could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("ad fragment has no title")]
    MissingTitle,

    #[error("ad fragment has no link")]
    MissingLink,

    #[error("ad link '{href}' does not resolve to an http(s) URL")]
    InvalidLink { href: String },
}

/// Records extracted from one page, plus what was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    /// Accepted records in document order
    pub records: Vec<AdRecord>,

    /// Fragments dropped because they were promoted
    pub promoted_skipped: usize,

    /// Fragments dropped because their structure did not match
    pub malformed_skipped: usize,
}

impl PageExtraction {
    /// Number of ad fragments the container selector matched
    pub fn fragments_seen(&self) -> usize {
        self.records.len() + self.promoted_skipped + self.malformed_skipped
    }
}

/// Compiles a CSS selector, naming the config field on failure
pub fn compile_selector(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    let invalid = || ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    };

    if selector.trim().is_empty() {
        return Err(invalid());
    }

    Selector::parse(selector).map_err(|_| invalid())
}

/// A typed view of one ad fragment
///
/// Lookups return `None` when the markup is absent instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    element: ElementRef<'a>,
}

impl<'a> Fragment<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// First descendant matching `selector`
    pub fn find(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.element.select(selector).next()
    }

    /// Whitespace-collapsed text of the first match, if any and non-empty
    pub fn find_text(&self, selector: &Selector) -> Option<String> {
        self.find(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// Attribute on the fragment's root element
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Class names on the fragment and on every ancestor, innermost first
    pub fn lineage_classes(&self) -> impl Iterator<Item = &'a str> + 'a {
        std::iter::once(self.element)
            .chain(self.element.ancestors().filter_map(ElementRef::wrap))
            .flat_map(|element| element.value().classes())
    }
}

/// Collects an element's text with runs of whitespace collapsed to one space
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the fragment sits in (or is) promoted-ad markup
///
/// Promoted ads are recognized by a class on the fragment or any ancestor that
/// starts with one of `prefixes`. The site appends build hashes to its class
/// names (`top-ads-container--1Jeoq`), hence prefix matching.
pub fn is_promoted(fragment: &Fragment<'_>, prefixes: &[String]) -> bool {
    fragment
        .lineage_classes()
        .any(|class| prefixes.iter().any(|p| class.starts_with(p.as_str())))
}

/// Strips the leading category segment from a location line
///
/// Keeps the text after the last `›`, trimmed. Text without a separator is
/// returned trimmed, so the function is idempotent.
///
/// # Examples
///
/// ```
/// use ad_harvester::normalize_location;
///
/// assert_eq!(normalize_location("Mobile Phones › Colombo"), "Colombo");
/// assert_eq!(normalize_location("Colombo"), "Colombo");
/// ```
pub fn normalize_location(raw: &str) -> String {
    normalize_location_with(raw, DEFAULT_LOCATION_SEPARATOR, LocationKeep::Last)
}

/// [`normalize_location`] with a site-specific separator and place side
///
/// The kept part never contains the separator, so every mode is idempotent.
///
/// # Examples
///
/// ```
/// use ad_harvester::crawler::{normalize_location_with, LocationKeep};
///
/// let place = normalize_location_with("Colombo, Mobile Phones", ",", LocationKeep::First);
/// assert_eq!(place, "Colombo");
/// ```
pub fn normalize_location_with(raw: &str, separator: &str, keep: LocationKeep) -> String {
    let trimmed = raw.trim();
    if separator.is_empty() {
        return trimmed.to_string();
    }

    let place = match keep {
        LocationKeep::First => trimmed.split(separator).next(),
        LocationKeep::Last => trimmed.rsplit(separator).next(),
    };

    place.unwrap_or(trimmed).trim().to_string()
}

/// Extracts ad records from result pages
pub struct AdExtractor {
    container: Selector,
    title: Selector,
    price: Selector,
    time_listed: Selector,
    location: Selector,
    anchor: Selector,
    promoted_class_prefixes: Vec<String>,
    location_separator: String,
    location_keep: LocationKeep,
}

impl AdExtractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(AdExtractor)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - A selector is empty or malformed
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile_selector("container", &config.container)?,
            title: compile_selector("title", &config.title)?,
            price: compile_selector("price", &config.price)?,
            time_listed: compile_selector("time-listed", &config.time_listed)?,
            location: compile_selector("location", &config.location)?,
            anchor: compile_selector("anchor", "a[href]")?,
            promoted_class_prefixes: config.promoted_class_prefixes.clone(),
            location_separator: config.location_separator.clone(),
            location_keep: config.location_keep,
        })
    }

    /// Parses one results page
    ///
    /// Promoted fragments are counted and dropped. Malformed fragments are
    /// logged, counted and dropped; they never abort the rest of the page.
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `page_url` - The page's own URL, used to resolve relative ad links
    ///
    /// # Example
    ///
    /// ```
    /// use ad_harvester::config::SelectorConfig;
    /// use ad_harvester::AdExtractor;
    /// use url::Url;
    ///
    /// let extractor = AdExtractor::new(&SelectorConfig::default()).unwrap();
    /// let html = r#"<ul><li><a class="card-link--3ssYv gtm-ad-item" href="/en/ad/iphone-13">
    ///     <h2 class="heading--2eONR">iPhone 13</h2>
    ///     <div class="price--3SnqI">Rs 185,000</div>
    /// </a></li></ul>"#;
    /// let page = Url::parse("https://ikman.lk/en/ads/sri-lanka/mobile-phones?page=1").unwrap();
    ///
    /// let extraction = extractor.extract_page(html, &page);
    /// assert_eq!(extraction.records[0].link, "https://ikman.lk/en/ad/iphone-13");
    /// assert_eq!(extraction.records[0].location, "");
    /// ```
    pub fn extract_page(&self, html: &str, page_url: &Url) -> PageExtraction {
        let document = Html::parse_document(html);
        let mut extraction = PageExtraction::default();

        for (index, element) in document.select(&self.container).enumerate() {
            match self.extract(Fragment::new(element), page_url) {
                Ok(Some(record)) => extraction.records.push(record),
                Ok(None) => extraction.promoted_skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        "Skipping ad fragment {} on {}: {}",
                        index + 1,
                        page_url,
                        e
                    );
                    extraction.malformed_skipped += 1;
                }
            }
        }

        tracing::debug!(
            "{}: {} ads, {} promoted, {} malformed",
            page_url,
            extraction.records.len(),
            extraction.promoted_skipped,
            extraction.malformed_skipped
        );

        extraction
    }

    /// Turns one fragment into a record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(AdRecord))` - A regular ad
    /// * `Ok(None)` - A promoted ad
    /// * `Err(ParseError)` - No usable title or link
    pub fn extract(
        &self,
        fragment: Fragment<'_>,
        page_url: &Url,
    ) -> Result<Option<AdRecord>, ParseError> {
        if is_promoted(&fragment, &self.promoted_class_prefixes) {
            return Ok(None);
        }

        let title = fragment
            .find_text(&self.title)
            .or_else(|| {
                fragment
                    .attr("title")
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            })
            .ok_or(ParseError::MissingTitle)?;

        let href = fragment
            .attr("href")
            .or_else(|| {
                fragment
                    .find(&self.anchor)
                    .and_then(|a| a.value().attr("href"))
            })
            .filter(|h| !h.trim().is_empty())
            .ok_or(ParseError::MissingLink)?;

        let link = resolve_link(href, page_url).ok_or_else(|| ParseError::InvalidLink {
            href: href.to_string(),
        })?;

        let location = fragment
            .find_text(&self.location)
            .map(|raw| {
                normalize_location_with(&raw, &self.location_separator, self.location_keep)
            })
            .unwrap_or_default();

        Ok(Some(AdRecord {
            title,
            price: fragment.find_text(&self.price).unwrap_or_default(),
            link: link.to_string(),
            time_listed: fragment.find_text(&self.time_listed).unwrap_or_default(),
            location,
        }))
    }
}
