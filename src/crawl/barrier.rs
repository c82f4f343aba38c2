// src/crawl/barrier.rs
// =============================================================================
// A counting barrier for one BFS level.
//
// The number of tasks in a level isn't known up front: every successful
// download spawns an extraction. So instead of counting to a fixed number,
// the barrier counts units of work that are still in flight.
//
// Protocol:
// - The count starts at 1, which stands for the driver itself
// - Before any unit of work is scheduled, the scheduler calls `register()`
//   and moves the returned ticket into the work
// - Dropping the ticket (on success, error, panic or when the queued work
//   is thrown away) counts the unit as finished
// - After scheduling the whole frontier the driver calls
//   `arrive_and_wait()`, which drops its own unit and waits for zero
//
// A download registers its extraction while still holding its own ticket,
// so the count can't touch zero between the two.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug)]
pub struct CompletionBarrier {
    pending: AtomicUsize,
    released: Notify,
}

impl CompletionBarrier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicUsize::new(1),
            released: Notify::new(),
        })
    }

    /// Adds one unit of in-flight work
    pub fn register(self: &Arc<Self>) -> BarrierTicket {
        self.pending.fetch_add(1, Ordering::AcqRel);
        BarrierTicket {
            barrier: Arc::clone(self),
        }
    }

    /// Units still in flight, including the driver's own until it arrives
    pub fn in_flight(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Drops the driver's unit and waits until every registered unit is done
    ///
    /// Must be called exactly once per barrier.
    pub async fn arrive_and_wait(&self) {
        self.arrive();
        loop {
            // Register interest before checking, so a release in between isn't missed
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            released.await;
        }
    }

    fn arrive(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.released.notify_waiters();
        }
    }
}

/// One registered unit of work; finishes the unit when dropped
#[derive(Debug)]
pub struct BarrierTicket {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for BarrierTicket {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is the ticket a struct with Drop instead of a `done()` method?
//    - Drop runs on every way out of a scope: normal return, `?`, panic
//    - It also runs when a queued job is thrown away without ever running
//    - So a unit can't be forgotten
//
// 2. What does `enable()` do on a Notified future?
//    - It registers the waiter with the Notify right away, before polling
//    - `notify_waiters()` only wakes waiters that are already registered
//
// 3. Why AcqRel / Acquire orderings?
//    - Writes made by a task before it drops its ticket (ledger entries,
//      next-level links) are visible to the driver once it sees zero
// -----------------------------------------------------------------------------
