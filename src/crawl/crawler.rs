// src/crawl/crawler.rs
// =============================================================================
// The public crawler: breadth-first, level by level.
//
// How a crawl runs:
// 1. The frontier starts as just the seed URL, at level 1
// 2. Every frontier URL not yet attempted is dispatched (download, then
//    link extraction) without waiting
// 3. The driver waits on the level's barrier until all of that work,
//    including extractions started along the way, has finished
// 4. The links collected during the level become the next frontier
// 5. Repeat until the depth limit, or until the crawler is closed
//
// Closing:
// - Sets a flag checked before each level starts
// - Shuts both worker pools down, which interrupts running work and
//   wakes a driver blocked on its barrier
// - The crawl then returns whatever it had recorded so far
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{watch, OnceCell};
use tracing::{info, warn};

use super::dispatch::{Dispatcher, LevelState};
use super::gate::HostGate;
use super::ledger::{CrawlResult, Ledger};
use super::pool::WorkerPool;
use crate::config::CrawlerConfig;
use crate::error::{check_positive, CrawlError};
use crate::fetch::Downloader;

pub struct WebCrawler {
    dispatcher: Dispatcher,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    closed: watch::Sender<bool>,
    released: OnceCell<()>,
}

impl WebCrawler {
    /// Creates a crawler with its two worker pools
    ///
    /// Must be called from inside a tokio runtime. Fails if any count in
    /// `config` is zero.
    pub fn new(downloader: Arc<dyn Downloader>, config: CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        tokio::runtime::Handle::try_current().map_err(|e| CrawlError::Startup {
            message: e.to_string(),
        })?;

        let download_pool = Arc::new(WorkerPool::new("download", config.downloaders));
        let extract_pool = Arc::new(WorkerPool::new("extract", config.extractors));
        let hosts = HostGate::new(config.per_host, Arc::clone(&download_pool));
        let dispatcher = Dispatcher::new(downloader, hosts, Arc::clone(&extract_pool));
        let (closed, _) = watch::channel(false);

        info!(
            downloaders = config.downloaders,
            extractors = config.extractors,
            per_host = config.per_host,
            "crawler started"
        );

        Ok(Self {
            dispatcher,
            download_pool,
            extract_pool,
            closed,
            released: OnceCell::new(),
        })
    }

    /// Crawls from `url`, following links up to `depth` levels
    ///
    /// `depth = 1` downloads only the seed. Per-URL failures end up in the
    /// result; only a zero depth is an error.
    pub async fn download(&self, url: &str, depth: usize) -> Result<CrawlResult, CrawlError> {
        check_positive("depth", depth)?;

        let ledger = Arc::new(Ledger::new());
        let mut frontier: HashSet<String> = HashSet::from([url.to_string()]);

        for level in 1..=depth {
            if self.is_closed() {
                info!(level, "crawler closed, not starting level");
                break;
            }

            let state = LevelState::new(Arc::clone(&ledger));
            let mut dispatched = 0usize;
            for url in frontier.drain() {
                if ledger.is_attempted(&url) {
                    continue;
                }
                self.dispatcher.dispatch(url, &state);
                dispatched += 1;
            }
            info!(level, depth, dispatched, "level dispatched");

            let finished = tokio::select! {
                _ = state.barrier.arrive_and_wait() => true,
                _ = self.closed_signal() => false,
            };
            if !finished {
                warn!(level, in_flight = state.barrier.in_flight(), "crawler closed while waiting for level");
                break;
            }

            if level < depth {
                frontier = state.next.iter().map(|link| link.key().clone()).collect();
            }
        }

        let result = ledger.snapshot();
        info!(
            downloaded = result.downloaded.len(),
            errors = result.errors.len(),
            "crawl finished"
        );
        Ok(result)
    }

    /// Stops the crawler; later calls do nothing
    ///
    /// No new level starts after this. Running downloads and extractions are
    /// interrupted and the pools are released.
    pub async fn close(&self) {
        if !self.closed.send_replace(true) {
            info!("closing crawler");
        }
        // Concurrent callers all wait for the one shutdown in progress
        self.released
            .get_or_init(|| async {
                self.download_pool.shutdown().await;
                self.extract_pool.shutdown().await;
            })
            .await;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    async fn closed_signal(&self) {
        let mut closed = self.closed.subscribe();
        // Err means the sender is gone, which only happens when the crawler is dropped
        let _ = closed.wait_for(|closed| *closed).await;
    }
}

impl Drop for WebCrawler {
    // Queued downloads hold their host slot, which holds the download pool,
    // so the pools have to be stopped explicitly to free them
    fn drop(&mut self) {
        self.closed.send_replace(true);
        self.download_pool.abort();
        self.extract_pool.abort();
    }
}
