// src/crawl/dispatch.rs
// =============================================================================
// Turns one frontier URL into downloads and extractions.
//
// For each URL:
// 1. Work out its host; a malformed URL fails right away
// 2. Register with the level's barrier and hand the download to the host gate
// 3. Download; a failure is recorded and that's the end of it
// 4. On success, record it, register the extraction with the barrier and
//    queue it on the extract pool (still inside the download task)
// 5. Extract links into the next level's frontier, on a blocking thread; a
//    failure replaces the URL's success with an extraction error
//
// Everything after step 2 runs on worker tasks; `dispatch` itself never waits.
// =============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::DashSet;
use futures::FutureExt;
use tracing::{debug, warn};

use super::barrier::CompletionBarrier;
use super::gate::HostGate;
use super::ledger::Ledger;
use super::pool::WorkerPool;
use crate::error::CrawlError;
use crate::fetch::{host_of, Document, Downloader};

/// State shared by all work of one BFS level
#[derive(Clone)]
pub struct LevelState {
    pub ledger: Arc<Ledger>,
    pub next: Arc<DashSet<String>>,
    pub barrier: Arc<CompletionBarrier>,
}

impl LevelState {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            next: Arc::new(DashSet::new()),
            barrier: CompletionBarrier::new(),
        }
    }
}

pub struct Dispatcher {
    downloader: Arc<dyn Downloader>,
    hosts: HostGate,
    extract_pool: Arc<WorkerPool>,
}

impl Dispatcher {
    pub fn new(downloader: Arc<dyn Downloader>, hosts: HostGate, extract_pool: Arc<WorkerPool>) -> Self {
        Self {
            downloader,
            hosts,
            extract_pool,
        }
    }

    #[cfg(test)]
    pub(crate) fn hosts(&self) -> &HostGate {
        &self.hosts
    }

    /// Schedules the download of `url`, followed by its link extraction
    pub fn dispatch(&self, url: String, level: &LevelState) {
        let host = match host_of(&url) {
            Ok(host) => host,
            Err(e) => {
                debug!(url = %url, error = %e, "skipping malformed URL");
                level.ledger.record_failure(&url, e);
                return;
            }
        };

        let ticket = level.barrier.register();
        let downloader = Arc::clone(&self.downloader);
        let extract_pool = Arc::clone(&self.extract_pool);
        let level = level.clone();

        let task = async move {
            let _ticket = ticket;
            debug!(url = %url, "downloading");

            let downloaded = AssertUnwindSafe(downloader.download(&url))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(anyhow::anyhow!("downloader panicked")));

            match downloaded {
                Ok(document) => {
                    level.ledger.record_success(&url);
                    schedule_extraction(&extract_pool, url, document, &level);
                }
                Err(e) => {
                    warn!(url = %url, error = %format!("{:#}", e), "download failed");
                    level.ledger.record_failure(&url, CrawlError::download(&e));
                }
            }
        };

        self.hosts.submit(&host, Box::pin(task));
    }
}

// Must be called while the download's own ticket is still held
fn schedule_extraction(
    pool: &WorkerPool,
    url: String,
    document: Box<dyn Document>,
    level: &LevelState,
) {
    let ticket = level.barrier.register();
    let job_url = url.clone();
    let job_level = level.clone();

    let job = async move {
        let _ticket = ticket;
        // extract_links blocks, so it runs on tokio's blocking threads
        let extracted = tokio::task::spawn_blocking(move || document.extract_links())
            .await
            .unwrap_or_else(|e| {
                if e.is_panic() {
                    Err(anyhow::anyhow!("link extraction panicked"))
                } else {
                    Err(anyhow::anyhow!("link extraction was cancelled"))
                }
            });

        match extracted {
            Ok(links) => {
                debug!(url = %job_url, links = links.len(), "extracted links");
                for link in links {
                    job_level.next.insert(link);
                }
            }
            Err(e) => {
                warn!(url = %job_url, error = %format!("{:#}", e), "link extraction failed");
                job_level.ledger.record_failure(&job_url, CrawlError::extract(&e));
            }
        }
    };

    if let Err(e) = pool.submit(Box::pin(job)) {
        warn!(url = %url, error = %e, "could not schedule link extraction");
        level.ledger.record_failure(&url, e);
    }
}
