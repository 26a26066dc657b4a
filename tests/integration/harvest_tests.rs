use crate::support::{
    ad_card, listing_page, promoted_card, read_csv_rows, run_timestamp, test_config,
};
use ad_harvester::crawler::run_harvest;
use ad_harvester::output::{RunOutcome, CSV_HEADER, EXIT_COMPLETE, EXIT_PARTIAL};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PHONES_PATH: &str = "/ads/category/phones";

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(PHONES_PATH))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn header_row() -> Vec<String> {
    CSV_HEADER.iter().map(|h| h.to_string()).collect()
}

#[tokio::test]
async fn test_promoted_skipped_and_failed_page_tolerated() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "1",
        listing_page(&[
            promoted_card("/en/ad/boosted-phone", "Boosted Phone"),
            ad_card(
                "/en/ad/galaxy-s21",
                "Samsung Galaxy S21",
                Some("Rs 95,000"),
                "Mobile Phones › Colombo",
            ),
            ad_card(
                "/en/ad/iphone-12",
                "Apple iPhone 12",
                Some("Rs 120,000"),
                "Mobile Phones › Kandy",
            ),
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path(PHONES_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let start_url = format!("{}{}?page=1", mock_server.uri(), PHONES_PATH);
    let config = test_config(&start_url, 2, output_dir.path());

    let summary = run_harvest(config, run_timestamp())
        .await
        .expect("Harvest failed");

    assert_eq!(summary.outcome(), RunOutcome::Partial);
    assert_eq!(summary.outcome().exit_status(), EXIT_PARTIAL);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.pages_failed(), 1);

    let failed = &summary.failed_pages[0];
    assert_eq!(failed.page, 2);
    assert_eq!(failed.url, format!("{}{}?page=2", mock_server.uri(), PHONES_PATH));
    assert!(failed.error.contains("HTTP 500"), "{}", failed.error);
    assert_eq!(summary.ads_written, 2);
    assert_eq!(summary.promoted_skipped, 1);

    let expected_path = output_dir.path().join("phones_2026-10-18_08-30-00.csv");
    assert_eq!(summary.output_path.as_deref(), Some(expected_path.as_path()));

    let rows = read_csv_rows(&expected_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], header_row());

    assert_eq!(rows[1][0], "Samsung Galaxy S21");
    assert_eq!(rows[1][1], "Rs 95,000");
    assert_eq!(rows[1][2], format!("{}/en/ad/galaxy-s21", mock_server.uri()));
    assert_eq!(rows[1][3], "2 hours ago");
    assert_eq!(rows[1][4], "Colombo");

    assert_eq!(rows[2][0], "Apple iPhone 12");
    assert_eq!(rows[2][4], "Kandy");

    assert!(rows.iter().all(|row| row[0] != "Boosted Phone"));
}

#[tokio::test]
async fn test_missing_price_written_as_empty() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "1",
        listing_page(&[ad_card(
            "/en/ad/nokia-3310",
            "Nokia 3310",
            None,
            "Mobile Phones › Galle",
        )]),
    )
    .await;

    let start_url = format!("{}{}", mock_server.uri(), PHONES_PATH);
    let config = test_config(&start_url, 1, output_dir.path());

    let summary = run_harvest(config, run_timestamp()).await.unwrap();
    assert_eq!(summary.outcome(), RunOutcome::Complete);
    assert_eq!(summary.outcome().exit_status(), EXIT_COMPLETE);

    let rows = read_csv_rows(summary.output_path.as_deref().unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "Nokia 3310");
    assert_eq!(rows[1][1], "");
    assert_eq!(rows[1][4], "Galle");
}

#[tokio::test]
async fn test_pages_requested_in_order_with_filters_kept() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    for page in ["1", "2", "3"] {
        mount_page(
            &mock_server,
            page,
            listing_page(&[ad_card(
                &format!("/en/ad/phone-{}", page),
                &format!("Phone {}", page),
                Some("Rs 10,000"),
                "Mobile Phones › Colombo",
            )]),
        )
        .await;
    }

    let start_url = format!(
        "{}{}?sort=date&page=1&query=samsung",
        mock_server.uri(),
        PHONES_PATH
    );
    let config = test_config(&start_url, 3, output_dir.path());

    let summary = run_harvest(config, run_timestamp()).await.unwrap();
    assert_eq!(summary.outcome(), RunOutcome::Complete);
    assert_eq!(summary.ads_written, 3);

    let requests = mock_server.received_requests().await.unwrap();
    let queries: Vec<String> = requests
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        queries,
        vec![
            "sort=date&page=1&query=samsung",
            "sort=date&page=2&query=samsung",
            "sort=date&page=3&query=samsung",
        ]
    );

    let titles: Vec<String> = read_csv_rows(summary.output_path.as_deref().unwrap())
        .into_iter()
        .skip(1)
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(titles, vec!["Phone 1", "Phone 2", "Phone 3"]);
}

#[tokio::test]
async fn test_delay_between_pages() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    for page in ["1", "2", "3"] {
        mount_page(&mock_server, page, listing_page(&[])).await;
    }

    let start_url = format!("{}{}", mock_server.uri(), PHONES_PATH);
    let mut config = test_config(&start_url, 3, output_dir.path());
    config.crawl.delay_seconds = 0.3;

    let started = Instant::now();
    let summary = run_harvest(config, run_timestamp()).await.unwrap();

    // Two pauses for three pages
    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.empty_pages, 3);

    let rows = read_csv_rows(summary.output_path.as_deref().unwrap());
    assert_eq!(rows, vec![header_row()]);
}

#[tokio::test]
async fn test_malformed_fragments_skipped() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "1",
        listing_page(&[
            ad_card(
                "/en/ad/untitled",
                "",
                Some("Rs 5,000"),
                "Mobile Phones › Matara",
            ),
            ad_card(
                "javascript:void(0)",
                "Script Link",
                Some("Rs 5,000"),
                "Mobile Phones › Matara",
            ),
            ad_card(
                "/en/ad/pixel-7",
                "Google Pixel 7",
                Some("Rs 150,000"),
                "Mobile Phones › Negombo",
            ),
        ]),
    )
    .await;

    let start_url = format!("{}{}", mock_server.uri(), PHONES_PATH);
    let config = test_config(&start_url, 1, output_dir.path());

    let summary = run_harvest(config, run_timestamp()).await.unwrap();
    assert_eq!(summary.outcome(), RunOutcome::Complete);
    assert_eq!(summary.malformed_skipped, 2);
    assert_eq!(summary.ads_written, 1);

    let rows = read_csv_rows(summary.output_path.as_deref().unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "Google Pixel 7");
    assert_eq!(rows[1][4], "Negombo");
}

#[tokio::test]
async fn test_interrupted_run_keeps_written_rows() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    let cards: Vec<String> = (1..=5)
        .map(|i| {
            ad_card(
                &format!("/en/ad/phone-{}", i),
                &format!("Phone {}", i),
                Some("Rs 20,000"),
                "Mobile Phones › Colombo",
            )
        })
        .collect();
    mount_page(&mock_server, "1", listing_page(&cards)).await;

    Mock::given(method("GET"))
        .and(path(PHONES_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let start_url = format!("{}{}", mock_server.uri(), PHONES_PATH);
    let config = test_config(&start_url, 2, output_dir.path());

    // Cancel the run while it waits on page 2
    let result = tokio::time::timeout(
        Duration::from_millis(1000),
        run_harvest(config, run_timestamp()),
    )
    .await;
    assert!(result.is_err(), "Run should have been cancelled");

    let path = output_dir.path().join("phones_2026-10-18_08-30-00.csv");
    let rows = read_csv_rows(&path);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], header_row());
    assert_eq!(rows[5][0], "Phone 5");
}

#[tokio::test]
async fn test_invalid_input_touches_nothing() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    let start_url = format!("{}{}", mock_server.uri(), PHONES_PATH);
    let config = test_config(&start_url, 0, output_dir.path());

    assert!(run_harvest(config, run_timestamp()).await.is_err());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
}
