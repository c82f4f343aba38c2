// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Two kinds of errors exist:
// - Errors returned from the public API (bad arguments, no async runtime)
// - Per-URL failures, which never abort a crawl and end up in the
//   `errors` map of a CrawlResult instead
//
// Both are the same enum so a caller only has one type to match on.
// CrawlError is Clone + Serialize so results can be copied out of the
// concurrent ledger and printed as JSON.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrawlError {
    /// A depth, pool size or per-host limit that is not a positive integer
    #[error("{name} must be a positive integer, got {value}")]
    InvalidArgument { name: &'static str, value: usize },

    /// The crawler could not start (for example, no tokio runtime)
    #[error("failed to start crawler: {message}")]
    Startup { message: String },

    /// A link that cannot be parsed into a URL with a host
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The downloader failed (network, HTTP status, IO)
    #[error("download failed: {message}")]
    Download { message: String },

    /// The page was downloaded but its links could not be extracted
    #[error("link extraction failed: {message}")]
    Extract { message: String },

    /// Work was rejected because a worker pool has been shut down
    #[error("{pool} pool is shut down")]
    PoolClosed { pool: &'static str },
}

impl CrawlError {
    /// Wraps a downloader error, keeping its whole context chain
    pub fn download(error: &anyhow::Error) -> Self {
        CrawlError::Download {
            message: format!("{:#}", error),
        }
    }

    /// Wraps a link extraction error, keeping its whole context chain
    pub fn extract(error: &anyhow::Error) -> Self {
        CrawlError::Extract {
            message: format!("{:#}", error),
        }
    }
}

/// Rejects zero for counts that must be positive
pub fn check_positive(name: &'static str, value: usize) -> Result<usize, CrawlError> {
    if value == 0 {
        Err(CrawlError::InvalidArgument { name, value })
    } else {
        Ok(value)
    }
}
