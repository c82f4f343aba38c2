// src/fetch/http.rs
// =============================================================================
// The default Downloader: fetches pages over HTTP(S) with reqwest.
//
// Key functionality:
// - One shared Client (connection pooling) with a timeout and redirect limit
// - Non-2xx responses count as download failures
// - The body is returned as an HtmlDocument; link extraction happens later
//   on an extract worker
// =============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{Document, Downloader, HtmlDocument};
use crate::config::HttpConfig;

/// Downloads pages with a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Box<dyn Document>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        // Relative links resolve against where we ended up, not where we started
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .with_context(|| format!("reading body of {}", url))?;

        Ok(Box::new(HtmlDocument::new(final_url, html)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves one canned HTTP response on a local port and returns its base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_download_and_extract() {
        let base = serve_once("HTTP/1.1 200 OK", r#"<a href="/next">Next</a>"#).await;
        let downloader = HttpDownloader::new(&HttpConfig::default()).unwrap();

        let document = downloader.download(&format!("{}/start", base)).await.unwrap();
        let links = document.extract_links().unwrap();

        assert_eq!(links, vec![format!("{}/next", base)]);
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let base = serve_once("HTTP/1.1 404 Not Found", "missing").await;
        let downloader = HttpDownloader::new(&HttpConfig::default()).unwrap();

        let err = downloader.download(&format!("{}/gone", base)).await.err().unwrap();
        assert!(err.to_string().contains("404"));
    }
}
