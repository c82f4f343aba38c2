// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of tokio worker tasks.
//
// How it works:
// - `size` workers share one unbounded job queue
// - Each worker pulls a job, runs it to completion, and pulls the next
// - So at most `size` jobs run at once; the rest wait in the queue
//
// Shutdown:
// - Closing the queue makes every later `submit` fail
// - Running workers are aborted and awaited
// - Jobs still queued are dropped without running
//
// Jobs own everything they need (including completion barrier tickets),
// so dropping a job is enough to release what it was holding.
// =============================================================================

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::CrawlError;

/// A unit of work for a pool
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct WorkerPool {
    name: &'static str,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    ///
    /// Panics if called outside a runtime; `WebCrawler::new` checks for one first.
    pub fn new(name: &'static str, size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| tokio::spawn(run_worker(name, id, Arc::clone(&receiver))))
            .collect();

        Self {
            name,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Queues a job; fails once the pool is shut down
    ///
    /// The job is dropped on failure.
    pub fn submit(&self, job: Job) -> Result<(), CrawlError> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender
                .send(job)
                .map_err(|_| CrawlError::PoolClosed { pool: self.name }),
            None => Err(CrawlError::PoolClosed { pool: self.name }),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stops accepting jobs, interrupts running ones and waits for the workers
    ///
    /// Safe to call more than once and from several tasks at a time.
    pub async fn shutdown(&self) {
        let workers = self.stop();
        for worker in workers {
            // Aborted workers report a cancelled JoinError, which is expected
            let _ = worker.await;
        }
    }

    /// Like `shutdown`, but doesn't wait for the workers to wind down
    pub fn abort(&self) {
        self.stop();
    }

    fn stop(&self) -> Vec<JoinHandle<()>> {
        self.sender.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());
        if !workers.is_empty() {
            debug!(pool = self.name, workers = workers.len(), "shutting down worker pool");
        }
        for worker in &workers {
            worker.abort();
        }
        workers
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_worker(
    pool: &'static str,
    id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>,
) {
    loop {
        // Hold the queue lock only while waiting for the next job
        let job = { receiver.lock().await.recv().await };
        let Some(job) = job else {
            break;
        };

        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            error!(pool, worker = id, "job panicked");
        }
    }
}
