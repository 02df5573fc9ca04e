//! Shared fixtures for the integration tests

use sitemap_harvest::config::Config;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a `<urlset>` listing `urls`
pub fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("  <url><loc>{}</loc></url>\n", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>",
        entries
    )
}

/// Renders a `<sitemapindex>` listing `children`
pub fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|u| format!("  <sitemap><loc>{}</loc></sitemap>\n", u))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</sitemapindex>",
        entries
    )
}

/// Serves `body` with status 200 at `route`
pub async fn mount_body(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.into()))
        .mount(server)
        .await;
}

/// Serves a small HTML page titled `title` at `route`
pub async fn mount_page(server: &MockServer, route: &str, title: &str) {
    mount_body(
        server,
        route,
        format!(
            "<html><head><title>{}</title></head><body><p>{}</p></body></html>",
            title, title
        ),
    )
    .await;
}

/// Absolute URLs on `server` for each path
pub fn urls_on(server: &MockServer, paths: &[&str]) -> Vec<String> {
    paths
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect()
}

/// Configuration writing everything under `root`, with short retry delays
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.max_concurrent = 3;
    config.crawler.max_retries = 2;
    config.crawler.retry_delay_ms = 10;
    config.http.timeout_secs = 5;
    config.output.content_dir = root.join("content").display().to_string();
    config.output.log_dir = root.join("logs").display().to_string();
    config.output.database_path = root.join("content").join("pages.db").display().to_string();
    config
}

/// Names of the files directly inside `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
