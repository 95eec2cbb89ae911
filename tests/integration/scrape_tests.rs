//! Integration tests for the scraper
//!
//! These tests use wiremock to serve magazine pages and run the full
//! scrape cycle end-to-end: validation, rate limiting, fetching,
//! extraction, aggregation and export.

use magazine_harvester::config::{Config, ExportFormat, OutputConfig, ScrapeConfig, SourceConfig};
use magazine_harvester::crawler::{CancelReason, PageFetcher};
use magazine_harvester::output::export_records;
use magazine_harvester::storage::SqliteStorage;
use magazine_harvester::{scrape_urls, ScrapeContext, ScrapeError, ScrapeOrchestrator};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// A magazine page with `count` article blocks
fn magazine_page(section: &str, count: usize) -> String {
    let items: String = (1..=count)
        .map(|i| {
            format!(
                r#"<article class="item">
                    <h3>  {section} story {i} </h3>
                    <a href="/articles/{section}-{i}">Read more</a>
                    <p class="description">Summary of
                        {section} story {i}</p>
                </article>"#
            )
        })
        .collect();

    format!("<html><body><main>{}</main></body></html>", items)
}

/// Creates a test configuration accepting pages from the mock server
fn create_test_config(server: &MockServer, scraper: ScrapeConfig) -> Config {
    Config {
        scraper,
        source: SourceConfig {
            url_prefix: format!("{}/", server.uri()),
            ..SourceConfig::default()
        },
        ..Config::default()
    }
}

fn fast_scraper(max_concurrency: usize) -> ScrapeConfig {
    ScrapeConfig {
        max_concurrency,
        max_requests_per_second: 100.0,
        overall_timeout: Duration::from_secs(10),
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_all_pages_succeed() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 3)).await;
    mount_page(&server, "/@news/world", magazine_page("world", 2)).await;

    let config = create_test_config(&server, fast_scraper(3));
    let urls = vec![
        format!("{}/@news/tech", server.uri()),
        format!("{}/@news/world", server.uri()),
    ];

    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;

    assert!(outcome.is_complete(), "unexpected error: {:?}", outcome.error);
    assert_eq!(outcome.records.len(), 5);

    let mut titles: Vec<&str> = outcome.records.iter().map(|r| r.title()).collect();
    titles.sort();
    assert_eq!(
        titles,
        vec!["tech story 1", "tech story 2", "tech story 3", "world story 1", "world story 2"]
    );

    let first_tech = outcome
        .records
        .iter()
        .find(|r| r.title() == "tech story 1")
        .expect("tech story 1 missing");
    assert_eq!(
        first_tech.source_url(),
        format!("{}/articles/tech-1", server.uri())
    );
    assert_eq!(first_tech.summary(), "Summary of tech story 1");
}

#[tokio::test]
async fn test_page_records_stay_in_document_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 4)).await;

    let config = create_test_config(&server, fast_scraper(1));
    let urls = vec![format!("{}/@news/tech", server.uri())];

    let records = scrape_urls(&ScrapeContext::new(), &urls, &config)
        .await
        .into_result()
        .unwrap();

    let titles: Vec<&str> = records.iter().map(|r| r.title()).collect();
    assert_eq!(
        titles,
        vec!["tech story 1", "tech story 2", "tech story 3", "tech story 4"]
    );
}

#[tokio::test]
async fn test_invalid_url_does_not_affect_others() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 2)).await;

    let config = create_test_config(&server, fast_scraper(2));
    let urls = vec![
        format!("{}/@news/tech", server.uri()),
        "http://invalid-url.com/page".to_string(),
    ];

    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;

    assert!(outcome.is_partial());
    assert_eq!(outcome.records.len(), 2);

    let error = outcome.error.expect("expected an error");
    assert!(matches!(error.root_cause(), ScrapeError::InvalidInput { .. }));
    assert!(error.to_string().contains("http://invalid-url.com/page"));
}

#[tokio::test]
async fn test_server_error_reported_as_fetch_failure() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 1)).await;

    Mock::given(method("GET"))
        .and(path("/@news/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server, fast_scraper(2));
    let urls = vec![
        format!("{}/@news/tech", server.uri()),
        format!("{}/@news/broken", server.uri()),
    ];

    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;

    assert_eq!(outcome.records.len(), 1);
    assert!(matches!(
        outcome.error.as_ref().map(ScrapeError::root_cause),
        Some(ScrapeError::FetchFailed { .. })
    ));
}

#[tokio::test]
async fn test_page_without_articles_is_success() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/@news/empty",
        "<html><body><p>Nothing here</p></body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&server, fast_scraper(1));
    let urls = vec![format!("{}/@news/empty", server.uri())];

    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;

    assert!(outcome.is_complete());
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn test_empty_input_rejected() {
    let outcome = scrape_urls(&ScrapeContext::new(), &[], &Config::default()).await;

    assert!(outcome.records.is_empty());
    assert!(matches!(outcome.error, Some(ScrapeError::EmptyInput)));
}

#[tokio::test]
async fn test_cancelled_context_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(magazine_page("tech", 1)))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, fast_scraper(2));
    let urls = vec![
        format!("{}/@news/a", server.uri()),
        format!("{}/@news/b", server.uri()),
    ];

    let ctx = ScrapeContext::new();
    ctx.cancel();

    let outcome = scrape_urls(&ctx, &urls, &config).await;

    assert!(outcome.records.is_empty());
    let error = outcome.error.expect("expected an error");
    assert!(error.is_cancelled());
    assert!(matches!(
        error.root_cause(),
        ScrapeError::Cancelled {
            reason: CancelReason::Requested
        }
    ));
}

#[tokio::test]
async fn test_cancel_during_slow_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/@news/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(magazine_page("slow", 1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server, fast_scraper(1));
    let urls = vec![format!("{}/@news/slow", server.uri())];

    let ctx = ScrapeContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let outcome = scrape_urls(&ctx, &urls, &config).await;

    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(outcome.records.is_empty());
    assert!(outcome.error.expect("expected an error").is_cancelled());
}

#[tokio::test]
async fn test_overall_timeout_bounds_invocation() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/fast", magazine_page("fast", 2)).await;

    Mock::given(method("GET"))
        .and(path("/@news/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(magazine_page("slow", 1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let scraper = ScrapeConfig {
        max_concurrency: 2,
        max_requests_per_second: 100.0,
        overall_timeout: Duration::from_millis(500),
    };
    let config = create_test_config(&server, scraper);
    let urls = vec![
        format!("{}/@news/fast", server.uri()),
        format!("{}/@news/slow", server.uri()),
    ];

    let start = Instant::now();
    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(outcome.records.len(), 2);
    let error = outcome.error.expect("expected an error");
    assert!(matches!(
        error.root_cause(),
        ScrapeError::Cancelled {
            reason: CancelReason::DeadlineExceeded
        }
    ));
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    for i in 1..=4 {
        mount_page(&server, &format!("/@news/{}", i), magazine_page("rated", 1)).await;
    }

    let scraper = ScrapeConfig {
        max_concurrency: 4,
        max_requests_per_second: 5.0,
        overall_timeout: Duration::from_secs(10),
    };
    let config = create_test_config(&server, scraper);
    let urls: Vec<String> = (1..=4)
        .map(|i| format!("{}/@news/{}", server.uri(), i))
        .collect();

    let start = Instant::now();
    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;
    let elapsed = start.elapsed();

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 4);
    // One immediate token, then one every 200ms
    assert!(
        elapsed >= Duration::from_millis(550),
        "four requests at 5 req/s finished in {:?}",
        elapsed
    );

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 4);
}

#[tokio::test]
async fn test_rejected_url_spends_no_rate_budget() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 1)).await;

    // One request every two seconds; the rejected URL runs first
    let scraper = ScrapeConfig {
        max_concurrency: 1,
        max_requests_per_second: 0.5,
        overall_timeout: Duration::from_secs(10),
    };
    let config = create_test_config(&server, scraper);
    let urls = vec![
        "http://bad.example/x".to_string(),
        format!("{}/@news/tech", server.uri()),
    ];

    let start = Instant::now();
    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.records.len(), 1);
    assert!(matches!(
        outcome.error.as_ref().map(ScrapeError::root_cause),
        Some(ScrapeError::InvalidInput { .. })
    ));
    assert!(
        elapsed < Duration::from_millis(1500),
        "valid URL waited for a second token: {:?}",
        elapsed
    );
}

/// Serves a page after a fixed delay and records when each request arrived
struct DelayedPage {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for DelayedPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_string(magazine_page("slow", 1))
            .insert_header("content-type", "text/html")
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_concurrency_bound_holds_end_to_end() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(200);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path_regex(r"^/@news/slow-\d+$"))
        .respond_with(DelayedPage {
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .mount(&server)
        .await;

    let config = create_test_config(&server, fast_scraper(2));
    let urls: Vec<String> = (1..=6)
        .map(|i| format!("{}/@news/slow-{}", server.uri(), i))
        .collect();

    let start = Instant::now();
    let outcome = scrape_urls(&ScrapeContext::new(), &urls, &config).await;
    let elapsed = start.elapsed();

    assert!(outcome.is_complete(), "unexpected error: {:?}", outcome.error);
    assert_eq!(outcome.records.len(), 6);
    // Six delayed pages, two at a time, take at least three rounds
    assert!(elapsed >= Duration::from_millis(550), "finished in {:?}", elapsed);

    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 6);

    // A request in flight occupies its slot for the whole delay, so no
    // window shorter than the delay may see more than two arrivals
    let window = delay - Duration::from_millis(50);
    for (i, first) in arrivals.iter().enumerate() {
        let in_flight = arrivals[i..]
            .iter()
            .take_while(|t| t.duration_since(*first) < window)
            .count();
        assert!(in_flight <= 2, "{} requests in flight at once", in_flight);
    }
}

#[tokio::test]
async fn test_repeated_scrapes_are_consistent() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 3)).await;

    let config = create_test_config(&server, fast_scraper(2));
    let orchestrator = ScrapeOrchestrator::from_config(&config).unwrap();
    let urls = vec![format!("{}/@news/tech", server.uri())];

    let first = orchestrator.scrape_urls(&ScrapeContext::new(), &urls).await;
    let second = orchestrator.scrape_urls(&ScrapeContext::new(), &urls).await;

    let summarize = |records: &[magazine_harvester::Record]| -> Vec<(String, String, String)> {
        records
            .iter()
            .map(|r| {
                (
                    r.title().to_string(),
                    r.source_url().to_string(),
                    r.summary().to_string(),
                )
            })
            .collect()
    };

    assert_eq!(summarize(&first.records), summarize(&second.records));
}

#[tokio::test]
async fn test_fetcher_rejects_foreign_url_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, fast_scraper(1));
    let fetcher = PageFetcher::from_config(&config).unwrap();

    let result = fetcher
        .fetch(&ScrapeContext::new(), "https://example.com/@news")
        .await;

    assert!(matches!(result, Err(ScrapeError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_scraped_records_export_to_csv_and_sqlite() {
    let server = MockServer::start().await;
    mount_page(&server, "/@news/tech", magazine_page("tech", 3)).await;

    let config = create_test_config(&server, fast_scraper(1));
    let urls = vec![format!("{}/@news/tech", server.uri())];
    let records = scrape_urls(&ScrapeContext::new(), &urls, &config)
        .await
        .into_result()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("harvest").to_string_lossy().into_owned();

    let csv_path = export_records(
        &OutputConfig {
            format: ExportFormat::Csv,
            path: base.clone(),
        },
        &records,
    )
    .unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Title,SourceURL,Summary,ObservedAt"));
    assert_eq!(csv.lines().count(), 4);

    let db_path = export_records(
        &OutputConfig {
            format: ExportFormat::Sqlite,
            path: base,
        },
        &records,
    )
    .unwrap();
    assert_eq!(db_path, dir.path().join("harvest.db"));

    let storage = SqliteStorage::new(&db_path).unwrap();
    let rows = storage.load_articles().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].title, "tech story 1");
}
