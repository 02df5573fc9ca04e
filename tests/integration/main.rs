//! Integration tests for Sitemap Harvest
//!
//! These tests use wiremock to create mock HTTP servers and exercise sitemap
//! resolution and complete runs end-to-end.

mod crawl_tests;
mod sitemap_tests;
mod support;
