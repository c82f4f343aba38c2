// src/fetch/html.rs
// =============================================================================
// This module extracts links from downloaded HTML pages.
//
// We use the `scraper` crate to parse HTML and select <a href> elements,
// and the `url` crate to resolve relative links against the page URL.
//
// HtmlDocument is what the HTTP downloader hands back to the crawler.
// It keeps the raw HTML and only parses it when the crawler asks for
// links, which happens on an extract worker rather than a download worker.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use scraper::{Html, Selector};
use url::Url;

use super::Document;

/// A downloaded HTML page
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    /// The URL the page was served from (after redirects)
    pub url: String,
    /// The page body
    pub html: String,
}

impl HtmlDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

impl Document for HtmlDocument {
    fn extract_links(&self) -> Result<Vec<String>> {
        extract_html_links(&self.html, &self.url)
    }
}

// Extracts all HTTP(S) links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: absolute URLs with their #fragment removed, in document order.
// Fails only if the base URL itself can't be parsed.
//
// Example:
//   html = "<a href='/docs#intro'>Docs</a>"
//   base_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(base_url).with_context(|| format!("invalid page URL '{}'", base_url))?;

    let selector = Selector::parse("a[href]").map_err(|e| anyhow!("bad selector: {:?}", e))?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .collect();

    Ok(links)
}

// Resolves a link (possibly relative) to an absolute HTTP(S) URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "#section" -> None (same page)
//   href = "mailto:a@b.c" -> None (not HTTP)
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}
