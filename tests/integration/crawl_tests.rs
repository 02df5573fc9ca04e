//! Integration tests for complete runs
//!
//! These tests drive the whole pipeline (resolve, manifest, crawl, run log)
//! against mock servers and temporary output directories.

use crate::support::{file_names, mount_body, mount_page, test_config, urls_on, urlset};
use rusqlite::Connection;
use sitemap_harvest::config::OutputFormat;
use sitemap_harvest::driver::{CrawlDecision, CrawlSelection, RunDriver};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_run_from_sitemap() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/page1", "/page2", "/page3"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_page(&server, "/page1", "One").await;
    mount_page(&server, "/page2", "Two").await;
    mount_page(&server, "/page3", "Three").await;

    let config = test_config(temp.path());
    let driver = RunDriver::from_config(&config)
        .unwrap()
        .with_config_hash("abc123");
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.decision, CrawlDecision::All { count: 3 });
    assert_eq!(report.statistics.total, 3);
    assert_eq!(report.statistics.processed, 3);
    assert_eq!(report.statistics.failed, 0);
    assert!(report.statistics.is_accounted());

    let content_dir = temp.path().join("content");
    let names = file_names(&content_dir);
    assert_eq!(names.len(), 4);
    assert_eq!(
        names.iter().filter(|n| n.contains("_sitemap_links_")).count(),
        1
    );
    assert!(names.iter().any(|n| n.contains("_page2_")));

    let manifest = std::fs::read_to_string(report.manifest_location.unwrap()).unwrap();
    assert!(manifest.contains("Total URLs found: 3"));
    assert!(manifest.contains(&format!("3. [{}]({})", pages[2], pages[2])));

    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert!(log.starts_with(&format!("Crawl Log for {}\n", server.uri())));
    assert!(log.contains("Config hash: abc123\n"));
    assert!(log.contains("Sitemap check completed in: "));
    assert!(log.contains(&format!(
        "Found 3 URLs in sitemap: {}/sitemap.xml",
        server.uri()
    )));
    assert!(log.contains("Saved sitemap links to: "));
    assert!(log.contains("Crawling all 3 URLs...\n"));
    assert!(log.contains("--- Crawl Statistics ---\n"));
    assert!(log.contains("Successfully crawled URLs: 3\n"));
    assert!(log.contains("Failed URLs: 0\n"));
    assert!(log.contains("URLs crawled per minute: "));
    assert!(log.contains("--- Total Process Statistics ---\n"));
}

#[tokio::test]
async fn test_run_without_sitemap_crawls_base_url() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>home</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let driver = RunDriver::from_config(&test_config(temp.path())).unwrap();
    let report = driver
        .run(&format!("{}/", server.uri()), CrawlSelection::All)
        .await
        .unwrap();

    assert_eq!(report.discovered, 0);
    assert_eq!(report.decision, CrawlDecision::BaseOnly);
    assert_eq!(report.sitemap_url, format!("{}/sitemap.xml", server.uri()));
    assert!(report.manifest_location.is_none());
    assert_eq!(report.statistics.total, 1);
    assert_eq!(report.statistics.processed, 1);
    assert_eq!(report.statistics.failed, 0);

    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("Crawling the base URL only."));
}

#[tokio::test]
async fn test_limit_crawls_prefix_of_discovered_urls() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/a", "/b", "/c", "/d"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_page(&server, "/a", "A").await;
    mount_page(&server, "/b", "B").await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let driver = RunDriver::from_config(&test_config(temp.path())).unwrap();
    let report = driver
        .run(&server.uri(), CrawlSelection::Limit(2))
        .await
        .unwrap();

    assert_eq!(
        report.decision,
        CrawlDecision::Subset {
            selected: 2,
            discovered: 4
        }
    );
    assert_eq!(report.statistics.total, 2);
    assert_eq!(report.statistics.processed, 2);

    // The manifest still lists everything discovered
    let manifest = std::fs::read_to_string(report.manifest_location.unwrap()).unwrap();
    assert!(manifest.contains("Total URLs found: 4"));
}

#[tokio::test]
async fn test_failing_page_is_retried_then_counted() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/good", "/broken"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_page(&server, "/good", "Good").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let driver = RunDriver::from_config(&test_config(temp.path())).unwrap();
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.statistics.processed, 1);
    assert_eq!(report.statistics.failed, 1);
    assert!(report.statistics.is_accounted());

    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("Successfully crawled URLs: 1\n"));
    assert!(log.contains("Failed URLs: 1\n"));
}

#[tokio::test]
async fn test_respect_robots_skips_disallowed_urls() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/public", "/private/secret"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_body(&server, "/robots.txt", "User-agent: *\nDisallow: /private\n").await;
    mount_page(&server, "/public", "Public").await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(temp.path());
    config.sitemap.respect_robots = true;

    let driver = RunDriver::from_config(&config).unwrap();
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.disallowed, 1);
    assert_eq!(report.statistics.total, 1);
    assert_eq!(report.statistics.processed, 1);
}

#[tokio::test]
async fn test_respect_robots_uses_group_for_browser_product_token() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/open", "/members/area"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_body(
        &server,
        "/robots.txt",
        "User-agent: Mozilla\nDisallow: /members\n\nUser-agent: *\nAllow: /\n",
    )
    .await;
    mount_page(&server, "/open", "Open").await;
    Mock::given(method("GET"))
        .and(path("/members/area"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(temp.path());
    config.sitemap.respect_robots = true;

    let driver = RunDriver::from_config(&config).unwrap();
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.disallowed, 1);
    assert_eq!(report.statistics.processed, 1);
}

#[tokio::test]
async fn test_everything_disallowed_is_logged_and_nothing_fetched() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/a", "/b"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_body(&server, "/robots.txt", "User-agent: *\nDisallow: /\n").await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(temp.path());
    config.sitemap.respect_robots = true;

    let driver = RunDriver::from_config(&config).unwrap();
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.disallowed, 2);
    assert_eq!(
        report.decision,
        CrawlDecision::NothingAllowed { discovered: 2 }
    );
    assert_eq!(report.statistics.total, 0);
    assert!(report.statistics.is_accounted());

    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("Skipped 2 URLs disallowed by robots.txt\n"));
    assert!(log.contains("All 2 discovered URLs are disallowed by robots.txt. Nothing to crawl.\n"));
    assert!(!log.contains("Crawling all 0 URLs"));
}

#[tokio::test]
async fn test_sqlite_output() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/one", "/two"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_page(&server, "/one", "First").await;
    mount_page(&server, "/two", "Second").await;

    let mut config = test_config(temp.path());
    config.output.format = OutputFormat::Sqlite;

    let driver = RunDriver::from_config(&config).unwrap();
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();
    assert_eq!(report.statistics.processed, 2);
    assert!(report
        .manifest_location
        .unwrap()
        .ends_with("pages.db#manifests/1"));

    let conn = Connection::open(&config.output.database_path).unwrap();
    let mut titles: Vec<String> = conn
        .prepare("SELECT title FROM pages")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    titles.sort();
    assert_eq!(titles, vec!["First", "Second"]);

    let entries: i64 = conn
        .query_row("SELECT COUNT(*) FROM manifest_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn test_cancelled_run_still_writes_log() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let pages = urls_on(&server, &["/x", "/y"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;

    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();

    let driver = RunDriver::from_config(&test_config(temp.path()))
        .unwrap()
        .with_cancellation(cancel);
    let report = driver.run(&server.uri(), CrawlSelection::All).await.unwrap();

    assert_eq!(report.statistics.cancelled, 2);
    assert_eq!(report.statistics.processed, 0);

    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("Cancelled URLs: 2\n"));
}
