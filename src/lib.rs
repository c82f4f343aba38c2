// src/lib.rs
// =============================================================================
// A concurrent breadth-first web crawler.
//
// Give it a seed URL and a depth; it downloads pages level by level with a
// bounded pool of download workers and a bounded pool of link extraction
// workers, never running more than a set number of downloads per host.
//
// Example:
//   let downloader = Arc::new(HttpDownloader::new(&HttpConfig::default())?);
//   let crawler = WebCrawler::new(downloader, CrawlerConfig::default())?;
//   let result = crawler.download("https://example.com", 2).await?;
//   crawler.close().await;
//
// Modules:
// - crawl: the crawler core
// - fetch: the Downloader/Document traits and their HTTP implementation
// - config: pool sizes, per-host limit, HTTP settings
// - error: the CrawlError type
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;

pub use config::{CrawlerConfig, HttpConfig};
pub use crawl::{CrawlResult, WebCrawler};
pub use error::CrawlError;
pub use fetch::{Document, Downloader, HttpDownloader};
