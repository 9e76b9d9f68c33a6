//! Axum route handlers for candidate matching.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::{run_match, MatchOptions, MatchResponse};
use crate::routes::input::JobDescriptionInput;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: MatchResponse,
    pub processed_at: DateTime<Utc>,
    pub total_candidates_found: usize,
    pub matching_candidates_count: usize,
    pub top_candidates_returned: usize,
}

/// POST /api/match
///
/// Full pipeline with resume PDFs merged into the report.
pub async fn handle_match(
    State(state): State<AppState>,
    input: JobDescriptionInput,
) -> Result<Json<MatchResponse>, AppError> {
    let options = MatchOptions {
        include_resumes: true,
        report_mode: input.report_mode,
    };
    let outcome = run_match(&state, &input.description, &input.extra_notes, options).await?;
    info!(
        "[{}] Returning {} candidates",
        outcome.response.report_id,
        outcome.response.candidates.len()
    );
    Ok(Json(outcome.response))
}

/// POST /api/webhook
///
/// Same pipeline without resume PDFs. The response is also re-posted to the
/// configured webhook URL in the background.
pub async fn handle_webhook(
    State(state): State<AppState>,
    input: JobDescriptionInput,
) -> Result<Json<Value>, AppError> {
    let options = MatchOptions {
        include_resumes: false,
        report_mode: input.report_mode,
    };
    let outcome = run_match(&state, &input.description, &input.extra_notes, options).await?;

    let response = WebhookResponse {
        success: true,
        top_candidates_returned: outcome.response.candidates.len(),
        result: outcome.response,
        processed_at: Utc::now(),
        total_candidates_found: outcome.total_candidates_found,
        matching_candidates_count: outcome.matching_candidates_count,
    };
    let body = serde_json::to_value(&response)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize webhook response: {e}")))?;

    if state.webhook.dispatch(body.clone()).is_some() {
        info!("[{}] Webhook delivery scheduled", response.result.report_id);
    }
    Ok(Json(body))
}
