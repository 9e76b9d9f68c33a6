use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_SPECIFIC_TERMS: &str = "qiwa,gosi,ajeer,muqeem,absher,tamkeen";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or numbers don't parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_api_key: String,
    /// When unset, uploaded job descriptions are extracted locally with pdf-extract.
    pub pdfco_api_key: Option<String>,
    /// When unset, webhook results are not re-posted anywhere.
    pub webhook_return_url: Option<String>,
    pub webhook_max_retries: u32,
    pub resume_fetch_timeout_secs: u64,
    pub ai_cache_capacity: usize,
    pub top_matches: usize,
    pub candidate_page_size: i64,
    /// Skills that only match as an exact value or a whole word.
    pub specific_skill_terms: Vec<String>,
    pub report_max_field_chars: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            database_url: require(&lookup, "DATABASE_URL")?,
            google_api_key: require(&lookup, "GOOGLE_GENERATIVE_AI_API_KEY")?,
            pdfco_api_key: optional("PDFCO_API_KEY"),
            webhook_return_url: optional("WEBHOOK_RETURN_URL"),
            webhook_max_retries: parse_or(&lookup, "WEBHOOK_MAX_RETRIES", 0)?,
            resume_fetch_timeout_secs: parse_or(&lookup, "RESUME_FETCH_TIMEOUT_SECS", 10)?,
            ai_cache_capacity: parse_or(&lookup, "AI_CACHE_CAPACITY", 1000)?,
            top_matches: parse_or(&lookup, "TOP_MATCHES", 10)?,
            candidate_page_size: parse_or(&lookup, "CANDIDATE_PAGE_SIZE", 1000)?,
            specific_skill_terms: split_terms(
                &optional("SPECIFIC_SKILL_TERMS")
                    .unwrap_or_else(|| DEFAULT_SPECIFIC_TERMS.to_string()),
            ),
            report_max_field_chars: parse_or(&lookup, "REPORT_MAX_FIELD_CHARS", 1500)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
