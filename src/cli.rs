// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// One command: crawl from a URL. Everything else is an optional flag.
// Flags that size the crawler fall back to CrawlerConfig::default() when
// they're not given, so the defaults live in one place.
//
// Rust concepts:
// - Derive macros: #[derive(Parser)] generates the argument parser
// - Option<T>: "not given on the command line" is None
// =============================================================================

use std::time::Duration;

use clap::Parser;

use web_crawler::{CrawlerConfig, HttpConfig};

#[derive(Parser, Debug)]
#[command(
    name = "web-crawler",
    version,
    about = "Crawl a website breadth-first and report which pages loaded",
    long_about = "web-crawler downloads a page, follows its links level by level up to --depth, \
                  and reports every page it downloaded plus every URL that failed and why. \
                  Downloads and link extraction run on separate worker pools, and no host \
                  ever sees more than --per-host downloads at once."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// How many levels to crawl
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    /// etc.
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    /// Number of download workers [default: half the CPU cores]
    #[arg(long)]
    pub downloaders: Option<usize>,

    /// Number of link extraction workers [default: the remaining CPU cores]
    #[arg(long)]
    pub extractors: Option<usize>,

    /// Maximum simultaneous downloads per host [default: unlimited]
    #[arg(long)]
    pub per_host: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Log crawl progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        let defaults = CrawlerConfig::default();
        CrawlerConfig {
            downloaders: self.downloaders.unwrap_or(defaults.downloaders),
            extractors: self.extractors.unwrap_or(defaults.extractors),
            per_host: self.per_host.unwrap_or(defaults.per_host),
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.timeout),
            ..HttpConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["web-crawler", "https://example.com"]);
        assert_eq!(cli.url, "https://example.com");
        assert_eq!(cli.depth, 2);
        assert!(!cli.json);
        assert_eq!(cli.crawler_config(), CrawlerConfig::default());
        assert_eq!(cli.http_config().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "web-crawler",
            "https://example.com",
            "--depth",
            "4",
            "--downloaders",
            "8",
            "--extractors",
            "3",
            "--per-host",
            "2",
            "--timeout",
            "30",
            "--json",
        ]);
        assert_eq!(cli.depth, 4);
        assert_eq!(cli.crawler_config(), CrawlerConfig::new(8, 3, 2));
        assert_eq!(cli.http_config().timeout, Duration::from_secs(30));
        assert!(cli.json);
    }
}
