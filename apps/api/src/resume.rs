//! Resume Fetcher: finds PDF references inside a candidate's resume field
//! and downloads or decodes them.

use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use bytes::Bytes;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Deepest nesting level the URL visitor descends into.
const MAX_VISIT_DEPTH: usize = 16;
const PDF_SIGNATURE: &[u8; 4] = b"%PDF";
const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

fn pdf_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(https?://[^\s]+\.pdf)|(data:application/pdf;base64,[^\s]+)")
            .expect("PDF reference pattern is valid")
    })
}

/// Collects distinct PDF URLs and base64 data URIs found anywhere in `resume`,
/// in first-seen order. Nesting deeper than `MAX_VISIT_DEPTH` is ignored.
pub fn extract_pdf_urls(resume: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    visit(resume, 0, &mut found, &mut seen);
    found
}

fn visit(value: &Value, depth: usize, found: &mut Vec<String>, seen: &mut HashSet<String>) {
    if depth > MAX_VISIT_DEPTH {
        return;
    }
    match value {
        Value::String(s) => {
            for m in pdf_reference_regex().find_iter(s) {
                let url = m.as_str().to_string();
                if seen.insert(url.clone()) {
                    found.push(url);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, depth + 1, found, seen);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                visit(item, depth + 1, found, seen);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// True when `bytes` starts with the `%PDF` file signature.
pub fn has_pdf_signature(bytes: &[u8]) -> bool {
    bytes.len() >= PDF_SIGNATURE.len() && &bytes[..PDF_SIGNATURE.len()] == PDF_SIGNATURE
}

#[derive(Clone)]
pub struct ResumeFetcher {
    client: Client,
    timeout: Duration,
}

impl ResumeFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches the first PDF referenced by a resume field.
    pub async fn fetch_for_resume(&self, resume: &Value) -> Option<Bytes> {
        let url = extract_pdf_urls(resume).into_iter().next()?;
        self.fetch(&url).await
    }

    /// Downloads (`http`/`https`) or decodes (`data:` URI) a PDF.
    ///
    /// Returns `None` on network errors, timeouts, non-2xx statuses, malformed
    /// base64, unsupported schemes, or bytes that are not a PDF.
    pub async fn fetch(&self, url: &str) -> Option<Bytes> {
        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.download(url).await?
        } else if let Some(encoded) = url.strip_prefix(PDF_DATA_URI_PREFIX) {
            match BASE64_STANDARD.decode(encoded.trim()) {
                Ok(decoded) => Bytes::from(decoded),
                Err(e) => {
                    warn!("Resume data URI is not valid base64: {e}");
                    return None;
                }
            }
        } else {
            warn!("Unsupported resume reference format: {}", preview(url));
            return None;
        };

        if !has_pdf_signature(&bytes) {
            warn!("Resume at {} is not a PDF", preview(url));
            return None;
        }

        debug!("Fetched resume PDF ({} bytes) from {}", bytes.len(), preview(url));
        Some(bytes)
    }

    async fn download(&self, url: &str) -> Option<Bytes> {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to fetch resume from {url}: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Failed to fetch resume from {url}: {}", response.status());
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to read resume body from {url}: {e}");
                None
            }
        }
    }
}

/// Keeps data URIs out of the logs.
fn preview(url: &str) -> String {
    if url.starts_with("data:") {
        format!("data URI ({} chars)", url.len())
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;

    const FAKE_PDF: &[u8] = b"%PDF-1.4\n%fake\n";

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fetcher(timeout: Duration) -> ResumeFetcher {
        ResumeFetcher::new(Client::new(), timeout)
    }

    fn test_router() -> Router {
        Router::new()
            .route("/cv.pdf", get(|| async { FAKE_PDF.to_vec() }))
            .route("/missing.pdf", get(|| async { StatusCode::NOT_FOUND }))
            .route("/html.pdf", get(|| async { "<html>not a pdf</html>" }))
            .route(
                "/slow.pdf",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    FAKE_PDF.to_vec()
                }),
            )
    }

    #[test]
    fn test_extract_from_plain_string() {
        let urls = extract_pdf_urls(&json!(
            "See https://cdn.example.com/cv/jane.pdf and https://cdn.example.com/cv/jane.pdf"
        ));
        assert_eq!(urls, vec!["https://cdn.example.com/cv/jane.pdf"]);
    }

    #[test]
    fn test_extract_from_nested_object_and_array() {
        let value = json!({
            "files": [
                {"url": "https://a.io/one.pdf"},
                {"meta": {"signed": "https://b.io/two.pdf"}}
            ],
            "inline": "data:application/pdf;base64,JVBERi0xLjQK",
            "count": 2
        });
        let urls = extract_pdf_urls(&value);
        assert_eq!(urls.len(), 3);
        assert!(urls.contains(&"https://a.io/one.pdf".to_string()));
        assert!(urls.contains(&"https://b.io/two.pdf".to_string()));
        assert!(urls.contains(&"data:application/pdf;base64,JVBERi0xLjQK".to_string()));
    }

    #[test]
    fn test_extract_ignores_non_pdf_links() {
        assert!(extract_pdf_urls(&json!("https://example.com/cv.docx")).is_empty());
        assert!(extract_pdf_urls(&json!(null)).is_empty());
    }

    #[test]
    fn test_extract_stops_at_depth_limit() {
        let mut value = json!("https://deep.io/cv.pdf");
        for _ in 0..(MAX_VISIT_DEPTH + 5) {
            value = json!({ "next": value });
        }
        assert!(extract_pdf_urls(&value).is_empty());

        let mut shallow = json!("https://deep.io/cv.pdf");
        for _ in 0..3 {
            shallow = json!([shallow]);
        }
        assert_eq!(extract_pdf_urls(&shallow).len(), 1);
    }

    #[test]
    fn test_pdf_signature() {
        assert!(has_pdf_signature(FAKE_PDF));
        assert!(!has_pdf_signature(b"%PD"));
        assert!(!has_pdf_signature(b"<html>"));
    }

    #[tokio::test]
    async fn test_fetch_valid_pdf() {
        let base = spawn_server(test_router()).await;
        let bytes = fetcher(Duration::from_secs(5))
            .fetch(&format!("{base}/cv.pdf"))
            .await;
        assert_eq!(bytes.as_deref(), Some(FAKE_PDF));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_none() {
        let base = spawn_server(test_router()).await;
        let bytes = fetcher(Duration::from_secs(5))
            .fetch(&format!("{base}/missing.pdf"))
            .await;
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_fetch_wrong_signature_is_none() {
        let base = spawn_server(test_router()).await;
        let bytes = fetcher(Duration::from_secs(5))
            .fetch(&format!("{base}/html.pdf"))
            .await;
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_none() {
        let base = spawn_server(test_router()).await;
        let bytes = fetcher(Duration::from_millis(200))
            .fetch(&format!("{base}/slow.pdf"))
            .await;
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_none() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let bytes = fetcher(Duration::from_secs(2))
            .fetch(&format!("http://{addr}/cv.pdf"))
            .await;
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_fetch_data_uri() {
        let uri = format!("{PDF_DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(FAKE_PDF));
        let bytes = fetcher(Duration::from_secs(1)).fetch(&uri).await;
        assert_eq!(bytes.as_deref(), Some(FAKE_PDF));
    }

    #[tokio::test]
    async fn test_fetch_malformed_base64_is_none() {
        let uri = format!("{PDF_DATA_URI_PREFIX}@@not-base64@@");
        assert!(fetcher(Duration::from_secs(1)).fetch(&uri).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_base64_of_non_pdf_is_none() {
        let uri = format!("{PDF_DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(b"hello world"));
        assert!(fetcher(Duration::from_secs(1)).fetch(&uri).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unsupported_scheme_is_none() {
        assert!(fetcher(Duration::from_secs(1))
            .fetch("ftp://files.example.com/cv.pdf")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_for_resume_uses_first_reference() {
        let base = spawn_server(test_router()).await;
        let resume = json!({ "primary": format!("{base}/cv.pdf") });
        let bytes = fetcher(Duration::from_secs(5)).fetch_for_resume(&resume).await;
        assert!(bytes.is_some());
        assert!(fetcher(Duration::from_secs(5))
            .fetch_for_resume(&json!("no links here"))
            .await
            .is_none());
    }
}
