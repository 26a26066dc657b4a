use url::Url;

/// Resolves an ad link href to an absolute http(s) URL
///
/// Returns None if the link cannot point at an ad page:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that fail to join onto the base
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use ad_harvester::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://ikman.lk/en/ads/sri-lanka/mobile-phones?page=2").unwrap();
/// let link = resolve_link("/en/ad/iphone-13-for-sale-colombo", &base).unwrap();
/// assert_eq!(link.as_str(), "https://ikman.lk/en/ad/iphone-13-for-sale-colombo");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}
