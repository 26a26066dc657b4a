//! Listing-page fixtures in the site's markup

use ad_harvester::config::Config;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// A regular ad card
pub fn ad_card(href: &str, title: &str, price: Option<&str>, location: &str) -> String {
    let price = price
        .map(|p| format!(r#"<div class="price--3SnqI"><span>{}</span></div>"#, p))
        .unwrap_or_default();

    format!(
        r#"<li class="normal--2QYVk gtm-normal-ad">
             <a class="card-link--3ssYv gtm-ad-item" href="{href}">
               <div class="content--3JNQz">
                 <h2 class="heading--2eONR">{title}</h2>
                 <div class="description--2-ez3">{location}</div>
                 {price}
                 <div class="updated-time--1DbCk">2 hours ago</div>
               </div>
             </a>
           </li>"#
    )
}

/// A card inside the promoted "top ads" block
pub fn promoted_card(href: &str, title: &str) -> String {
    format!(
        r#"<div class="top-ads-container--1Jeoq"><ul>{}</ul></div>"#,
        ad_card(href, title, Some("Rs 999"), "Mobile Phones › Colombo")
    )
}

/// Wraps cards into a full results page
pub fn listing_page(cards: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Results</title></head>
           <body><div class="list--3NxGO"><ul class="list--3NxGO">{}</ul></div></body></html>"#,
        cards.join("\n")
    )
}

/// Config pointing at a mock site and a temporary output directory
pub fn test_config(start_url: &str, page_count: u32, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.start_url = start_url.to_string();
    config.crawl.page_count = page_count;
    config.http.timeout_seconds = 2;
    config.output.directory = output_dir.to_string_lossy().into_owned();
    config
}

/// Fixed run start time so output file names are predictable
pub fn run_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

/// Reads the output file as raw CSV rows, header included
pub fn read_csv_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open output CSV");

    reader
        .records()
        .map(|row| {
            row.expect("Unreadable CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
