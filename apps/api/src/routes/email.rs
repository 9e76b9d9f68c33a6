use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

/// POST /api/email-collector
pub async fn handle_email_collector(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let email = request.email.unwrap_or_default();
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    state.store.record_incoming_email(email).await?;
    info!("Recorded incoming email");

    Ok(Json(json!({ "success": true })))
}
