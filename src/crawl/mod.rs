// src/crawl/mod.rs
// =============================================================================
// This module is the crawler core.
//
// Pieces, from the bottom up:
// - pool: fixed-size pools of worker tasks (one for downloads, one for
//   link extraction)
// - gate: caps concurrent downloads per host, queueing the rest in order
// - barrier: lets the driver wait for every task a BFS level spawned
// - ledger: which URLs were attempted, and which failed and why
// - dispatch: download-then-extract for a single URL
// - crawler: the BFS driver and the public WebCrawler API
// =============================================================================

pub mod barrier;
pub mod dispatch;
pub mod gate;
pub mod ledger;
pub mod pool;

mod crawler;

#[cfg(test)]
pub(crate) mod testing;

pub use crawler::WebCrawler;
pub use ledger::CrawlResult;
