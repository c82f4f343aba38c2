// src/main.rs
// =============================================================================
// This is the entry point of the web-crawler binary.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, filtered by RUST_LOG)
// 3. Run one crawl; Ctrl-C closes the crawler and keeps the partial result
// 4. Print the downloaded pages and errors as a table or JSON
// 5. Exit with 0 (no errors), 1 (some URLs failed) or 2 (couldn't run)
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use web_crawler::{CrawlResult, HttpDownloader, WebCrawler};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "web_crawler=info"
    } else {
        "web_crawler=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = cli.crawler_config();
    let downloader = Arc::new(HttpDownloader::new(&cli.http_config())?);
    let crawler = Arc::new(WebCrawler::new(downloader, config)?);

    if !cli.json {
        println!("🔍 Crawling: {}", cli.url);
        println!("📊 Depth: {}", cli.depth);
    }

    // Ctrl-C stops the crawl; download() then returns what it has so far
    let interrupt = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, closing crawler");
                crawler.close().await;
            }
        })
    };

    let result = crawler.download(&cli.url, cli.depth).await;
    interrupt.abort();
    crawler.close().await;
    let result = result?;

    print_results(&result, cli.json)?;

    Ok(if result.errors.is_empty() { 0 } else { 1 })
}

// Prints the results either as a table or JSON
fn print_results(result: &CrawlResult, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_table(result);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(result: &CrawlResult) {
    let mut downloaded: Vec<&String> = result.downloaded.iter().collect();
    downloaded.sort();
    let mut errors: Vec<_> = result.errors.iter().collect();
    errors.sort_by(|a, b| a.0.cmp(b.0));

    println!();
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    for url in downloaded {
        println!("{:<60} {:<15}", truncate(url), "✅ OK");
    }
    for (url, error) in errors {
        println!("{:<60} {:<15} {:<30}", truncate(url), "❌ FAILED", error.to_string());
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Downloaded: {}", result.downloaded.len());
    println!("   ❌ Failed: {}", result.errors.len());
    println!("   📋 Total: {}", result.downloaded.len() + result.errors.len());
}

// Truncates long URLs so the table stays aligned
fn truncate(url: &str) -> String {
    if url.chars().count() > 57 {
        let head: String = url.chars().take(57).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}
