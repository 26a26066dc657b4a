use crate::InputError;
use url::form_urlencoded;
use url::Url;

/// Query parameter carrying the page number on the listing site
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// Parses and checks the start URL of a run
///
/// The URL must be absolute, use http or https, and name a host. Surrounding
/// whitespace is ignored.
///
/// # Examples
///
/// ```
/// use ad_harvester::url::parse_start_url;
///
/// assert!(parse_start_url("https://ikman.lk/en/ads/sri-lanka/mobile-phones").is_ok());
/// assert!(parse_start_url("/en/ads/sri-lanka/mobile-phones").is_err());
/// assert!(parse_start_url("ftp://ikman.lk/ads").is_err());
/// ```
pub fn parse_start_url(raw: &str) -> Result<Url, InputError> {
    let invalid = |reason: String| InputError::InvalidStartUrl {
        url: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("no start URL given".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!(
            "only http and https are supported, got {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}

/// Builds the URL of one results page
///
/// The first occurrence of `param` in the query is rewritten in place and any
/// further occurrences are dropped; when absent, `param` is appended. Every
/// other query segment is kept byte-for-byte and in order.
///
/// # Examples
///
/// ```
/// use ad_harvester::url::page_url;
/// use url::Url;
///
/// let start = Url::parse("https://ikman.lk/en/ads/sri-lanka/mobile-phones?query=iphone").unwrap();
/// assert_eq!(
///     page_url(&start, "page", 3).as_str(),
///     "https://ikman.lk/en/ads/sri-lanka/mobile-phones?query=iphone&page=3"
/// );
/// ```
pub fn page_url(start: &Url, param: &str, page: u32) -> Url {
    let encoded_param: String = form_urlencoded::byte_serialize(param.as_bytes()).collect();
    let page_segment = format!("{}={}", encoded_param, page);

    let mut segments = Vec::new();
    let mut rewritten = false;

    for segment in start.query().unwrap_or("").split('&') {
        if segment.is_empty() {
            continue;
        }

        if segment_key(segment).as_deref() == Some(param) {
            if !rewritten {
                segments.push(page_segment.clone());
                rewritten = true;
            }
        } else {
            segments.push(segment.to_string());
        }
    }

    if !rewritten {
        segments.push(page_segment);
    }

    let mut url = start.clone();
    url.set_query(Some(&segments.join("&")));
    url
}

/// Decoded key of a raw `key=value` query segment
fn segment_key(segment: &str) -> Option<String> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}

/// Lazily yields `(page_number, url)` for pages 1 through N
///
/// The driver does not know the site's real page count. Asking for more pages
/// than exist simply produces URLs that return fewer or no ads.
#[derive(Debug, Clone)]
pub struct PageUrls {
    base: Url,
    param: String,
    next: u32,
    remaining: u32,
}

impl PageUrls {
    /// Total number of pages this driver was created for
    pub fn page_count(&self) -> u32 {
        self.next - 1 + self.remaining
    }
}

impl Iterator for PageUrls {
    type Item = (u32, Url);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let page = self.next;
        self.remaining -= 1;
        self.next = self.next.saturating_add(1);

        Some((page, page_url(&self.base, &self.param, page)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PageUrls {}

/// Creates the page URL sequence using the default `page` parameter
///
/// # Arguments
///
/// * `start` - The first results page; filters travel as query parameters
/// * `page_count` - Number of pages, at least 1
///
/// # Returns
///
/// * `Ok(PageUrls)` - Iterator over exactly `page_count` URLs
/// * `Err(InputError)` - `page_count` was zero
///
/// # Examples
///
/// ```
/// use ad_harvester::url::page_urls;
/// use url::Url;
///
/// let start = Url::parse("https://example.test/ads/category/phones?page=7&sort=date").unwrap();
/// let urls: Vec<String> = page_urls(&start, 2)
///     .unwrap()
///     .map(|(_, url)| url.to_string())
///     .collect();
///
/// assert_eq!(urls, vec![
///     "https://example.test/ads/category/phones?page=1&sort=date",
///     "https://example.test/ads/category/phones?page=2&sort=date",
/// ]);
/// ```
pub fn page_urls(start: &Url, page_count: u32) -> Result<PageUrls, InputError> {
    page_urls_with_param(start, DEFAULT_PAGE_PARAM, page_count)
}

/// Creates the page URL sequence for a site using a different page parameter
pub fn page_urls_with_param(
    start: &Url,
    param: &str,
    page_count: u32,
) -> Result<PageUrls, InputError> {
    if page_count < 1 {
        return Err(InputError::InvalidPageCount(page_count));
    }

    Ok(PageUrls {
        base: start.clone(),
        param: param.to_string(),
        next: 1,
        remaining: page_count,
    })
}

/// Derives a file-name-safe category from the last path segment of a URL
///
/// `https://ikman.lk/en/ads/sri-lanka/mobile-phones?page=2` gives
/// `mobile-phones`. Characters other than ASCII alphanumerics, `-` and `_`
/// are dropped.
pub fn category_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;

    let category: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if category.is_empty() {
        None
    } else {
        Some(category)
    }
}
