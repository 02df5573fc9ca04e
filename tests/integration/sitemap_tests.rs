//! Sitemap resolution against mock servers

use crate::support::{mount_body, sitemap_index, urls_on, urlset};
use reqwest::Client;
use sitemap_harvest::config::HttpConfig;
use sitemap_harvest::crawler::build_http_client;
use sitemap_harvest::sitemap::SitemapResolver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver() -> SitemapResolver {
    let client: Client = build_http_client(&HttpConfig::default()).unwrap();
    SitemapResolver::new(client, 10)
}

#[tokio::test]
async fn test_index_with_two_children_yields_all_urls_in_order() {
    let server = MockServer::start().await;

    let posts = urls_on(&server, &["/post/1", "/post/2", "/post/3"]);
    let pages = urls_on(&server, &["/about", "/contact"]);

    mount_body(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&urls_on(&server, &["/posts.xml", "/pages.xml"])),
    )
    .await;
    mount_body(&server, "/posts.xml", urlset(&posts)).await;
    mount_body(&server, "/pages.xml", urlset(&pages)).await;

    let resolution = resolver()
        .resolve(&format!("{}/sitemap_index.xml", server.uri()))
        .await;

    let expected: Vec<String> = posts.into_iter().chain(pages).collect();
    assert_eq!(resolution.urls.len(), 5);
    assert_eq!(resolution.urls, expected);
    assert_eq!(
        resolution.sitemap_url,
        format!("{}/sitemap_index.xml", server.uri())
    );
}

#[tokio::test]
async fn test_site_address_guesses_sitemap_xml() {
    let server = MockServer::start().await;
    let pages = urls_on(&server, &["/", "/docs"]);
    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolution = resolver().resolve(&format!("{}/", server.uri())).await;
    assert_eq!(resolution.base_url, server.uri());
    assert_eq!(resolution.sitemap_url, format!("{}/sitemap.xml", server.uri()));
    assert_eq!(resolution.urls, pages);
}

#[tokio::test]
async fn test_robots_fallback_after_missing_sitemap() {
    let server = MockServer::start().await;
    let pages = urls_on(&server, &["/a", "/b"]);

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_body(
        &server,
        "/robots.txt",
        format!(
            "User-agent: *\nDisallow: /private\nSitemap: {}/custom-sitemap.xml\n",
            server.uri()
        ),
    )
    .await;
    mount_body(&server, "/custom-sitemap.xml", urlset(&pages)).await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(
        resolution.sitemap_url,
        format!("{}/custom-sitemap.xml", server.uri())
    );
    assert_eq!(resolution.urls, pages);
}

#[tokio::test]
async fn test_robots_fallback_after_non_xml_sitemap() {
    let server = MockServer::start().await;
    let pages = urls_on(&server, &["/only"]);

    // Soft 404: a 200 HTML page where the sitemap should be
    mount_body(&server, "/sitemap.xml", "<html><body>Not here</body></html>").await;
    mount_body(
        &server,
        "/robots.txt",
        format!("sitemap: {}/real.xml", server.uri()),
    )
    .await;
    mount_body(&server, "/real.xml", urlset(&pages)).await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(resolution.urls, pages);
}

#[tokio::test]
async fn test_no_sitemap_anywhere() {
    let server = MockServer::start().await;
    mount_body(&server, "/robots.txt", "User-agent: *\nAllow: /\n").await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(resolution.sitemap_url, format!("{}/sitemap.xml", server.uri()));
    assert!(resolution.urls.is_empty());
}

#[tokio::test]
async fn test_no_sitemap_and_no_robots() {
    let server = MockServer::start().await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(resolution.sitemap_url, format!("{}/sitemap.xml", server.uri()));
    assert!(resolution.is_empty());
}

#[tokio::test]
async fn test_index_cycle_terminates() {
    let server = MockServer::start().await;
    let pages = urls_on(&server, &["/p1", "/p2"]);

    mount_body(
        &server,
        "/sitemap-a.xml",
        sitemap_index(&urls_on(&server, &["/sitemap-b.xml"])),
    )
    .await;
    mount_body(
        &server,
        "/sitemap-b.xml",
        sitemap_index(&urls_on(&server, &["/sitemap-a.xml", "/sitemap-pages.xml"])),
    )
    .await;
    mount_body(&server, "/sitemap-pages.xml", urlset(&pages)).await;

    let resolution = resolver()
        .resolve(&format!("{}/sitemap-a.xml", server.uri()))
        .await;
    assert_eq!(resolution.urls, pages);
}

#[tokio::test]
async fn test_nested_indexes_keep_document_order() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/sitemap.xml",
        sitemap_index(&urls_on(&server, &["/sitemap-nested.xml", "/sitemap-tail.xml"])),
    )
    .await;
    mount_body(
        &server,
        "/sitemap-nested.xml",
        sitemap_index(&urls_on(&server, &["/sitemap-x.xml", "/sitemap-y.xml"])),
    )
    .await;
    mount_body(&server, "/sitemap-x.xml", urlset(&urls_on(&server, &["/x"]))).await;
    mount_body(&server, "/sitemap-y.xml", urlset(&urls_on(&server, &["/y1", "/y2"]))).await;
    mount_body(&server, "/sitemap-tail.xml", urlset(&urls_on(&server, &["/z"]))).await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(
        resolution.urls,
        urls_on(&server, &["/x", "/y1", "/y2", "/z"])
    );
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/sitemap.xml",
        sitemap_index(&urls_on(&server, &["/s1.xml", "/s2.xml"])),
    )
    .await;
    mount_body(&server, "/s1.xml", urlset(&urls_on(&server, &["/b", "/a"]))).await;
    mount_body(&server, "/s2.xml", urlset(&urls_on(&server, &["/d", "/c"]))).await;

    let resolver = resolver();
    let first = resolver.resolve(&server.uri()).await;
    let second = resolver.resolve(&server.uri()).await;

    assert_eq!(first, second);
    assert_eq!(first.urls.len(), 4);
}

#[tokio::test]
async fn test_failing_child_does_not_abort_resolution() {
    let server = MockServer::start().await;

    mount_body(
        &server,
        "/sitemap.xml",
        sitemap_index(&urls_on(&server, &["/s-down.xml", "/s-ok.xml"])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/s-down.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_body(&server, "/s-ok.xml", urlset(&urls_on(&server, &["/ok"]))).await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert_eq!(resolution.urls, urls_on(&server, &["/ok"]));
}
