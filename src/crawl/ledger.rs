// src/crawl/ledger.rs
// =============================================================================
// The per-crawl record of which URLs were attempted and how they ended.
//
// Two concurrent maps, both written from many worker tasks at once:
// - visits: URL -> Success | Failure, written once and never overwritten.
//   Presence means "already attempted", so the URL is skipped at every
//   later level.
// - errors: URL -> reason. Last write wins. A page that downloads fine but
//   then fails link extraction keeps its Success visit (it is not retried)
//   and gets an extraction error here, which replaces the success in the
//   final result.
//
// DashMap shards its locks, so unrelated URLs rarely contend.
// =============================================================================

use std::collections::HashMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::CrawlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Success,
    Failure,
}

#[derive(Debug, Default)]
pub struct Ledger {
    visits: DashMap<String, Visit>,
    errors: DashMap<String, CrawlError>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the URL already has an outcome in this crawl
    pub fn is_attempted(&self, url: &str) -> bool {
        self.visits.contains_key(url)
    }

    #[cfg(test)]
    pub(crate) fn visit(&self, url: &str) -> Option<Visit> {
        self.visits.get(url).map(|visit| *visit)
    }

    pub fn record_success(&self, url: &str) {
        self.record_visit(url, Visit::Success);
    }

    /// Records a failure reason for the URL
    ///
    /// Marks the URL as a failed visit unless it already has an outcome;
    /// the reason itself replaces any earlier reason.
    pub fn record_failure(&self, url: &str, error: CrawlError) {
        self.record_visit(url, Visit::Failure);
        self.errors.insert(url.to_string(), error);
    }

    fn record_visit(&self, url: &str, visit: Visit) {
        if let Entry::Vacant(entry) = self.visits.entry(url.to_string()) {
            entry.insert(visit);
        }
    }

    /// Copies the current state into a result
    ///
    /// Can be called while workers are still writing; it then reflects
    /// whatever had been recorded so far.
    pub fn snapshot(&self) -> CrawlResult {
        let errors: HashMap<String, CrawlError> = self
            .errors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let downloaded = self
            .visits
            .iter()
            .filter(|entry| *entry.value() == Visit::Success)
            .map(|entry| entry.key().clone())
            .filter(|url| !errors.contains_key(url))
            .collect();

        CrawlResult { downloaded, errors }
    }
}

/// The outcome of one crawl
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlResult {
    /// URLs that were downloaded and had their links extracted, in no particular order
    pub downloaded: Vec<String>,
    /// Every URL that failed, with the reason
    pub errors: HashMap<String, CrawlError>,
}
