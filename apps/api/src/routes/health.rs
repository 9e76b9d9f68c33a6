use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::llm_client;
use crate::state::AppState;

/// GET /health, GET /api/health
///
/// Reports which optional integrations are configured. Required variables
/// are validated at startup, so only optional ones can be missing here.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    let integrations = [
        ("PDFCO_API_KEY", config.pdfco_api_key.is_some()),
        ("WEBHOOK_RETURN_URL", config.webhook_return_url.is_some()),
    ];
    let missing: Vec<&str> = integrations
        .iter()
        .filter(|(_, set)| !set)
        .map(|(key, _)| *key)
        .collect();

    let message = if missing.is_empty() {
        "All optional integrations are configured".to_string()
    } else {
        format!("Optional integrations not configured: {}", missing.join(", "))
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "match-api",
        "timestamp": Utc::now().to_rfc3339(),
        "integrations": {
            "database": true,
            "ai_model": llm_client::MODEL,
            "pdfco": config.pdfco_api_key.is_some(),
            "jd_extractor": state.jd_extractor.name(),
            "webhook": state.webhook.is_configured(),
        },
        "missing_variables": missing,
        "message": message,
    }))
}
