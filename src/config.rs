// src/config.rs
// =============================================================================
// Crawler configuration.
//
// CrawlerConfig sizes the two worker pools and the per-host limit.
// HttpConfig tunes the default HTTP downloader.
//
// Defaults split the machine's cores between downloading and extracting,
// and leave the per-host limit unbounded. The CLI overrides any field.
// =============================================================================

use std::time::Duration;

use crate::error::{check_positive, CrawlError};

/// Sizes of the crawler's worker pools and its per-host limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerConfig {
    /// Number of download workers
    pub downloaders: usize,
    /// Number of link extraction workers
    pub extractors: usize,
    /// Maximum concurrent downloads per host
    pub per_host: usize,
}

impl CrawlerConfig {
    pub fn new(downloaders: usize, extractors: usize, per_host: usize) -> Self {
        Self {
            downloaders,
            extractors,
            per_host,
        }
    }

    /// Fails with an argument error if any value is zero
    pub fn validate(&self) -> Result<(), CrawlError> {
        check_positive("downloaders", self.downloaders)?;
        check_positive("extractors", self.extractors)?;
        check_positive("per_host", self.per_host)?;
        Ok(())
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self::for_cores(cores)
    }
}

impl CrawlerConfig {
    fn for_cores(cores: usize) -> Self {
        let downloaders = (cores / 2).max(1);
        let extractors = downloaders.min(cores.saturating_sub(downloaders)).max(1);
        Self {
            downloaders,
            extractors,
            per_host: usize::MAX,
        }
    }
}

/// Settings for the reqwest-backed downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Redirects followed before giving up
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("web-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_splits_cores() {
        assert_eq!(CrawlerConfig::for_cores(8), CrawlerConfig::new(4, 4, usize::MAX));
        assert_eq!(CrawlerConfig::for_cores(3), CrawlerConfig::new(1, 1, usize::MAX));
        assert_eq!(CrawlerConfig::for_cores(1), CrawlerConfig::new(1, 1, usize::MAX));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(CrawlerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let err = CrawlerConfig::new(0, 1, 1).validate().unwrap_err();
        assert_eq!(err, CrawlError::InvalidArgument { name: "downloaders", value: 0 });

        let err = CrawlerConfig::new(1, 0, 1).validate().unwrap_err();
        assert_eq!(err, CrawlError::InvalidArgument { name: "extractors", value: 0 });

        let err = CrawlerConfig::new(1, 1, 0).validate().unwrap_err();
        assert_eq!(err, CrawlError::InvalidArgument { name: "per_host", value: 0 });
    }
}
