use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::catalog::{self, CatalogEntry};
use crate::error::FetchError;

static PRE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("pre").expect("Invalid CSS selector for payload block"));

/// Anything that can turn an allow-list into filtered catalog entries.
///
/// The pipeline drives this trait rather than a concrete client so the retry
/// behavior can be exercised against scripted sources.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_filtered(&self, allow: &[String]) -> Result<Vec<CatalogEntry>, FetchError>;
}

/// Fetches the catalog document over HTTP and filters its embedded payload.
///
/// Stateless across calls: every fetch opens a fresh request and nothing is
/// cached, so a retried run always sees the live catalog.
pub struct CatalogFetcher {
    client: Client,
    url: Url,
    failure_debounce: Duration,
}

impl CatalogFetcher {
    pub fn new(client: Client, url: Url, failure_debounce: Duration) -> Self {
        Self {
            client,
            url,
            failure_debounce,
        }
    }

    #[instrument(level = "debug", skip(self, allow), fields(url = %self.url, allow = allow.len()))]
    async fn try_fetch_filtered(&self, allow: &[String]) -> Result<Vec<CatalogEntry>, FetchError> {
        debug!("fetching catalog document");
        let html = self.fetch_document().await?;
        let payload = extract_payload(&html, self.url.as_str())?;
        let catalog = catalog::parse_payload(&payload)?;
        let total = catalog.product.len();
        let entries = catalog::filter_entries(catalog, allow);
        info!(total, kept = entries.len(), "filtered catalog entries");
        Ok(entries)
    }

    async fn fetch_document(&self) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|source| FetchError::Request {
            url: self.url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogFetcher {
    /// Fetch, extract, parse and filter in one pass. Failures are held back
    /// for the configured debounce before they reach the caller, giving
    /// transient network hiccups a moment to clear before the retry loop
    /// engages.
    async fn fetch_filtered(&self, allow: &[String]) -> Result<Vec<CatalogEntry>, FetchError> {
        match self.try_fetch_filtered(allow).await {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    url = %self.url,
                    error = %e,
                    delay_ms = self.failure_debounce.as_millis() as u64,
                    "catalog fetch failed, holding before reporting"
                );
                sleep(self.failure_debounce).await;
                Err(e)
            }
        }
    }
}

/// Pull the JSON text out of the document's first `<pre>` block.
fn extract_payload(html: &str, url: &str) -> Result<String, FetchError> {
    let document = Html::parse_document(html);
    let block = document
        .select(&PRE_SELECTOR)
        .next()
        .ok_or_else(|| FetchError::MissingPayload {
            url: url.to_string(),
        })?;
    Ok(block.text().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::Instant;

    const PAYLOAD: &str = r#"{
        "product": [
            {"id": 1001, "name": "Lamp", "category": "Home", "price": 120000,
             "weight": 400, "description": "Desk lamp", "etalase": "Featured",
             "condition": "New", "images": ["https://img.example/a.jpg"], "videos": []},
            {"id": 9999, "name": "Chair", "category": "Home", "price": 90000,
             "weight": 2500, "description": "Chair", "etalase": "Featured",
             "condition": "New", "images": [], "videos": []}
        ]
    }"#;

    /// Serve one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "{status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn allow(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_first_pre_block() {
        let html = r#"<html><body>
            <pre>{"product": []}</pre>
            <pre>second block</pre>
        </body></html>"#;
        let payload = extract_payload(html, "http://example/").unwrap();
        assert_eq!(payload, r#"{"product": []}"#);
    }

    #[test]
    fn document_without_pre_is_missing_payload() {
        let err = extract_payload("<html><body><p>nope</p></body></html>", "http://example/")
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingPayload { .. }));
    }

    #[tokio::test]
    async fn fetches_and_filters_a_served_catalog() {
        let body = format!("<html><body><pre>{PAYLOAD}</pre></body></html>");
        let url = serve_once("HTTP/1.1 200 OK", body).await;

        let fetcher = CatalogFetcher::new(Client::new(), url, Duration::ZERO);
        let entries = fetcher.fetch_filtered(&allow(&["1001"])).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Lamp");
        assert_eq!(entries[0].cell_count(), 9);
    }

    #[tokio::test]
    async fn non_success_status_is_a_status_error() {
        let url = serve_once("HTTP/1.1 404 Not Found", String::new()).await;
        let fetcher = CatalogFetcher::new(Client::new(), url, Duration::ZERO);
        let err = fetcher.fetch_filtered(&allow(&["1001"])).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn failure_is_debounced_before_it_surfaces() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let debounce = Duration::from_millis(250);
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let fetcher = CatalogFetcher::new(Client::new(), url, debounce);

        let started = Instant::now();
        let err = fetcher.fetch_filtered(&allow(&["1001"])).await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(started.elapsed() >= debounce);
    }
}
