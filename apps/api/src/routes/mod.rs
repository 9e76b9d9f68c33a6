pub mod diagnostics;
pub mod email;
pub mod health;
pub mod input;
pub mod matches;
pub mod pdf;


use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Matching
        .route("/api/match", post(matches::handle_match))
        .route("/api/webhook", post(matches::handle_webhook))
        // PDF utilities
        .route("/api/extract-pdf", post(pdf::handle_extract_pdf))
        .route("/api/proxy-pdf", get(pdf::handle_proxy_pdf))
        // Intake
        .route("/api/email-collector", post(email::handle_email_collector))
        // Diagnostics
        .route("/api/test-ai", get(diagnostics::handle_test_ai))
        .route("/api/test-feedback", post(diagnostics::handle_test_feedback))
        .route("/api/test-webhook", post(diagnostics::handle_test_webhook))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Last-resort 500 in the same `{error, code}` shape as `AppError`.
fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    AppError::Internal(anyhow::anyhow!("handler panicked")).into_response()
}
