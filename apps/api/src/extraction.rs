//! Job-description PDF → text.
//!
//! `PdfCoExtractor` uses the PDF.co conversion API (upload, convert, download).
//! `LocalPdfExtractor` runs `pdf-extract` on a blocking thread and is used
//! when no PDF.co key is configured.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

pub const PDFCO_BASE_URL: &str = "https://api.pdf.co/v1";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{stage} failed with status {status}")]
    Status { stage: &'static str, status: u16 },

    #[error("{0} response did not include a URL")]
    MissingUrl(&'static str),

    #[error("PDF text extraction failed: {0}")]
    Parse(String),

    #[error("No text could be extracted from the PDF")]
    Empty,
}

#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ExtractionError>;

    /// Short name for logs and the health report.
    fn name(&self) -> &'static str;
}

#[derive(Deserialize)]
struct UrlResponse {
    url: Option<String>,
}

pub struct PdfCoExtractor {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PdfCoExtractor {
    pub fn new(client: Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, PDFCO_BASE_URL.to_string())
    }

    pub fn with_base_url(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn upload(&self, pdf: Bytes) -> Result<String, ExtractionError> {
        let part = multipart::Part::bytes(pdf.to_vec())
            .file_name("document.pdf")
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/file/upload", self.base_url))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;
        Self::url_from(response, "Upload").await
    }

    async fn convert(&self, uploaded_url: &str) -> Result<String, ExtractionError> {
        let response = self
            .client
            .post(format!("{}/pdf/convert/to/text", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&json!({ "url": uploaded_url, "async": false }))
            .send()
            .await?;
        Self::url_from(response, "Conversion").await
    }

    async fn url_from(
        response: reqwest::Response,
        stage: &'static str,
    ) -> Result<String, ExtractionError> {
        if !response.status().is_success() {
            return Err(ExtractionError::Status {
                stage,
                status: response.status().as_u16(),
            });
        }
        let body: UrlResponse = response.json().await?;
        body.url
            .filter(|u| !u.is_empty())
            .ok_or(ExtractionError::MissingUrl(stage))
    }
}

#[async_trait]
impl PdfTextExtractor for PdfCoExtractor {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ExtractionError> {
        let uploaded = self.upload(pdf).await?;
        debug!("Uploaded job description PDF to PDF.co");
        let text_url = self.convert(&uploaded).await?;

        let response = self.client.get(&text_url).send().await?;
        if !response.status().is_success() {
            return Err(ExtractionError::Status {
                stage: "Text download",
                status: response.status().as_u16(),
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        info!("Extracted {} characters via PDF.co", text.len());
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "pdfco"
    }
}

pub struct LocalPdfExtractor;

#[async_trait]
impl PdfTextExtractor for LocalPdfExtractor {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ExtractionError> {
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        info!("Extracted {} characters locally", text.len());
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
