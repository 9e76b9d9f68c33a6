//! PDF utilities: text extraction for uploads and a same-origin resume proxy.

use axum::{
    extract::{Multipart, Query, State},
    http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use std::time::Duration;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// POST /api/extract-pdf
pub async fn handle_extract_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut upload: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        upload = Some((content_type, bytes));
    }

    let Some((content_type, bytes)) = upload else {
        return Err(AppError::Validation("No file provided".to_string()));
    };
    if content_type.as_deref() != Some("application/pdf") {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }

    let text = state.jd_extractor.extract_text(bytes).await?;
    Ok(Json(json!({ "text": text })))
}

/// GET /api/proxy-pdf?url=
///
/// Relays a remote PDF so the browser can display it inline. The fetch is
/// bounded by the resume fetch timeout and the upload size limit.
pub async fn handle_proxy_pdf(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, AppError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("PDF URL is required".to_string()))?;
    let limit = state.config.max_upload_bytes;

    let mut upstream = state
        .http
        .get(&url)
        .timeout(Duration::from_secs(state.config.resume_fetch_timeout_secs))
        .send()
        .await
        .map_err(proxy_error)?;

    if !upstream.status().is_success() {
        warn!("PDF proxy upstream returned {}", upstream.status());
        return Err(AppError::Upstream {
            status: upstream.status().as_u16(),
            message: "Failed to fetch PDF".to_string(),
        });
    }

    if upstream.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large(limit));
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = upstream.chunk().await.map_err(proxy_error)? {
        if body.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    info!("Proxied PDF ({} bytes)", body.len());

    Ok((
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "inline"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        body.freeze(),
    )
        .into_response())
}

fn proxy_error(e: reqwest::Error) -> AppError {
    warn!("PDF proxy request failed: {e}");
    if e.is_timeout() {
        AppError::Upstream {
            status: 504,
            message: "Timed out fetching PDF".to_string(),
        }
    } else {
        AppError::Upstream {
            status: 502,
            message: "Failed to fetch PDF".to_string(),
        }
    }
}

fn too_large(limit: usize) -> AppError {
    AppError::Upstream {
        status: 502,
        message: format!("PDF exceeds the {limit} byte limit"),
    }
}
