use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::enrichment::Enricher;
use crate::extraction::{LocalPdfExtractor, PdfCoExtractor, PdfTextExtractor};
use crate::llm_client::TextModel;
use crate::matching::SkillMatcher;
use crate::resume::ResumeFetcher;
use crate::store::InterviewStore;
use crate::webhook::WebhookNotifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InterviewStore>,
    pub model: Arc<dyn TextModel>,
    /// Owns the AI result caches; shared by every request.
    pub enricher: Arc<Enricher>,
    pub matcher: Arc<SkillMatcher>,
    pub resumes: ResumeFetcher,
    /// PDF.co when `PDFCO_API_KEY` is set, otherwise local pdf-extract.
    pub jd_extractor: Arc<dyn PdfTextExtractor>,
    pub webhook: WebhookNotifier,
    /// Plain client for proxying PDFs.
    pub http: Client,
    pub config: Config,
}

impl AppState {
    pub fn build(
        config: Config,
        store: Arc<dyn InterviewStore>,
        model: Arc<dyn TextModel>,
    ) -> Self {
        let http = Client::new();

        let jd_extractor: Arc<dyn PdfTextExtractor> = match &config.pdfco_api_key {
            Some(key) => Arc::new(PdfCoExtractor::new(http.clone(), key.clone())),
            None => Arc::new(LocalPdfExtractor),
        };

        Self {
            enricher: Arc::new(Enricher::new(model.clone(), config.ai_cache_capacity)),
            matcher: Arc::new(SkillMatcher::new(&config.specific_skill_terms)),
            resumes: ResumeFetcher::new(
                http.clone(),
                Duration::from_secs(config.resume_fetch_timeout_secs),
            ),
            webhook: WebhookNotifier::new(
                http.clone(),
                config.webhook_return_url.clone(),
                config.webhook_max_retries,
            ),
            jd_extractor,
            store,
            model,
            http,
            config,
        }
    }
}
