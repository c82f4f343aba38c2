// src/crawl/gate.rs
// =============================================================================
// Per-host admission: at most `per_host` downloads run against one host.
//
// How it works:
// - Each host gets a HostSlot the first time it is seen
// - A slot counts its active downloads and queues the rest in FIFO order
// - When a download finishes, its slot is handed straight to the next
//   queued task; only when the queue is empty does the active count drop
//
// Each slot has its own mutex, so different hosts never wait on each other.
// Slots live as long as the crawler, across crawls.
//
// Handing a slot over submits the next task to the download pool as a new
// job instead of running it in place, so long queues never grow the stack.
// =============================================================================

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::pool::{Job, WorkerPool};

pub struct HostGate {
    per_host: usize,
    pool: Arc<WorkerPool>,
    hosts: DashMap<String, Arc<HostSlot>>,
}

impl HostGate {
    pub fn new(per_host: usize, pool: Arc<WorkerPool>) -> Self {
        Self {
            per_host,
            pool,
            hosts: DashMap::new(),
        }
    }

    /// Runs `task` on the download pool once the host has a free slot
    pub fn submit(&self, host: &str, task: Job) {
        self.slot(host).admit(task);
    }

    /// Number of hosts seen so far
    #[cfg(test)]
    pub(crate) fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// (active, queued) for a host, if it has been seen
    #[cfg(test)]
    pub(crate) fn load(&self, host: &str) -> Option<(usize, usize)> {
        self.hosts.get(host).map(|slot| {
            let state = slot.state.lock();
            (state.active, state.pending.len())
        })
    }

    fn slot(&self, host: &str) -> Arc<HostSlot> {
        if let Some(slot) = self.hosts.get(host) {
            return Arc::clone(slot.value());
        }
        let slot = self.hosts.entry(host.to_string()).or_insert_with(|| {
            debug!(host, "new host");
            Arc::new(HostSlot {
                host: host.to_string(),
                limit: self.per_host,
                pool: Arc::clone(&self.pool),
                state: Mutex::new(HostState::default()),
            })
        });
        Arc::clone(slot.value())
    }
}

#[derive(Default)]
struct HostState {
    active: usize,
    pending: VecDeque<Job>,
}

struct HostSlot {
    host: String,
    limit: usize,
    pool: Arc<WorkerPool>,
    state: Mutex<HostState>,
}

impl HostSlot {
    fn admit(self: &Arc<Self>, task: Job) {
        {
            let mut state = self.state.lock();
            if state.active >= self.limit {
                state.pending.push_back(task);
                return;
            }
            state.active += 1;
        }

        if !self.dispatch(task) {
            self.release();
        }
    }

    // Sends a task to the pool, wrapped so that it gives its slot back when done.
    // Returns false if the pool refused it; the task has been dropped then.
    fn dispatch(self: &Arc<Self>, task: Job) -> bool {
        let slot = Arc::clone(self);
        let job = async move {
            // A panicking task must still free its slot
            let _ = AssertUnwindSafe(task).catch_unwind().await;
            slot.release();
        };

        match self.pool.submit(Box::pin(job)) {
            Ok(()) => true,
            Err(e) => {
                warn!(host = %self.host, error = %e, "dropping download");
                false
            }
        }
    }

    // Hands the slot to the next queued task, or frees it if none is waiting
    fn release(self: &Arc<Self>) {
        loop {
            let next = {
                let mut state = self.state.lock();
                match state.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        state.active -= 1;
                        return;
                    }
                }
            };

            if self.dispatch(next) {
                return;
            }
        }
    }
}
