// src/crawl/testing.rs
// =============================================================================
// An in-memory web for crawler tests.
//
// FakeWeb is a Downloader over a fixed set of pages. It also records what
// the crawler did to it:
// - how many times each URL was downloaded
// - the highest number of simultaneous downloads per host
// - the order in which downloads started and finished
// - the highest number of simultaneous link extractions
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::fetch::{host_of, Document, Downloader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

#[derive(Debug, Clone)]
enum Page {
    Links(Vec<String>),
    Broken,
    Unparsable,
    Explosive,
}

#[derive(Default)]
struct Record {
    downloads: HashMap<String, usize>,
    active: HashMap<String, usize>,
    peak: HashMap<String, usize>,
    events: Vec<Event>,
}

#[derive(Default)]
struct ExtractGauge {
    active: usize,
    peak: usize,
}

#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, Page>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    parse_time: Duration,
    record: Mutex<Record>,
    extracting: Arc<Mutex<ExtractGauge>>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that downloads fine and links to `links`
    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|link| link.to_string()).collect();
        self.pages.insert(url.to_string(), Page::Links(links));
        self
    }

    /// A page whose download fails
    pub fn broken(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Page::Broken);
        self
    }

    /// A page that downloads but whose links can't be extracted
    pub fn unparsable(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Page::Unparsable);
        self
    }

    /// A page whose link extraction panics
    pub fn explosive(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Page::Explosive);
        self
    }

    /// How long every link extraction blocks its thread
    pub fn parse_time(mut self, delay: Duration) -> Self {
        self.parse_time = delay;
        self
    }

    /// How long every download takes
    pub fn latency(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// How long downloading one URL takes, overriding `latency`
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn download_count(&self, url: &str) -> usize {
        self.record.lock().downloads.get(url).copied().unwrap_or(0)
    }

    pub fn total_downloads(&self) -> usize {
        self.record.lock().downloads.values().sum()
    }

    pub fn peak_concurrency(&self, host: &str) -> usize {
        self.record.lock().peak.get(host).copied().unwrap_or(0)
    }

    pub fn peak_extractions(&self) -> usize {
        self.extracting.lock().peak
    }

    pub fn events(&self) -> Vec<Event> {
        self.record.lock().events.clone()
    }

    /// Position of an event in the log, if it happened
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.record.lock().events.iter().position(|e| e == event)
    }

    fn start(&self, url: &str, host: &str) {
        let mut record = self.record.lock();
        *record.downloads.entry(url.to_string()).or_default() += 1;
        let active = record.active.entry(host.to_string()).or_default();
        *active += 1;
        let now = *active;
        let peak = record.peak.entry(host.to_string()).or_default();
        *peak = (*peak).max(now);
        record.events.push(Event::Started(url.to_string()));
    }

    fn finish(&self, url: &str, host: &str) {
        let mut record = self.record.lock();
        if let Some(active) = record.active.get_mut(host) {
            *active -= 1;
        }
        record.events.push(Event::Finished(url.to_string()));
    }
}

#[async_trait]
impl Downloader for FakeWeb {
    async fn download(&self, url: &str) -> Result<Box<dyn Document>> {
        let host = host_of(url)?;
        self.start(url, &host);

        let delay = self.delays.get(url).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let page = self.pages.get(url).cloned();

        self.finish(url, &host);
        let page = match page {
            Some(Page::Broken) => return Err(anyhow!("HTTP 500 Internal Server Error")),
            None => return Err(anyhow!("HTTP 404 Not Found")),
            Some(page) => page,
        };
        Ok(Box::new(FakeDocument {
            page,
            parse_time: self.parse_time,
            extracting: Arc::clone(&self.extracting),
        }))
    }
}

struct FakeDocument {
    page: Page,
    parse_time: Duration,
    extracting: Arc<Mutex<ExtractGauge>>,
}

impl Document for FakeDocument {
    fn extract_links(&self) -> Result<Vec<String>> {
        {
            let mut gauge = self.extracting.lock();
            gauge.active += 1;
            gauge.peak = gauge.peak.max(gauge.active);
        }
        if !self.parse_time.is_zero() {
            std::thread::sleep(self.parse_time);
        }
        self.extracting.lock().active -= 1;

        match &self.page {
            Page::Links(links) => Ok(links.clone()),
            Page::Explosive => panic!("parser blew up"),
            _ => Err(anyhow!("unexpected end of document")),
        }
    }
}
