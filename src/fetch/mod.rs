// src/fetch/mod.rs
// =============================================================================
// This module defines how the crawler gets pages and their links.
//
// The crawler core only knows two traits:
// - Downloader: turns a URL into a Document (may fail)
// - Document: lists the URLs a page links to (may fail)
//
// Submodules provide the default implementations:
// - http: downloads pages with reqwest
// - html: extracts <a href> links with scraper
//
// Tests plug in their own in-memory Downloader instead.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;
use url::Url;

use crate::error::CrawlError;

pub use html::{extract_html_links, HtmlDocument};
pub use http::HttpDownloader;

/// Fetches documents by URL
///
/// Implementations may cache or retry; the crawler calls `download` from
/// inside a download worker and never more than once per URL per crawl.
#[async_trait]
pub trait Downloader: Send + Sync + 'static {
    async fn download(&self, url: &str) -> anyhow::Result<Box<dyn Document>>;
}

/// A downloaded page that can list its outgoing links
pub trait Document: Send + Sync {
    fn extract_links(&self) -> anyhow::Result<Vec<String>>;
}

/// Returns the host part of a URL
///
/// Fails for strings that don't parse as absolute URLs and for URLs
/// without a host (like `mailto:` or `data:`).
pub fn host_of(url: &str) -> Result<String, CrawlError> {
    let parsed = Url::parse(url).map_err(|e| CrawlError::MalformedUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| CrawlError::MalformedUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        })
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What is #[async_trait]?
//    - Plain traits can't be used as `dyn Trait` with async methods yet
//    - async_trait rewrites each async method to return a boxed future
//
// 2. Why `Send + Sync + 'static` on Downloader?
//    - One downloader is shared (Arc) by every download worker task
//    - tokio tasks can move between threads, so everything they hold must be Send
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of_absolute_url() {
        assert_eq!(host_of("https://example.com/a/b?q=1").unwrap(), "example.com");
        assert_eq!(host_of("http://sub.example.com:8080/").unwrap(), "sub.example.com");
    }

    #[test]
    fn test_host_of_rejects_garbage() {
        let err = host_of("not a url").unwrap_err();
        assert!(matches!(err, CrawlError::MalformedUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn test_host_of_rejects_hostless() {
        let err = host_of("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, CrawlError::MalformedUrl { ref reason, .. } if reason == "URL has no host"));
    }
}
