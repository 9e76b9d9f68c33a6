//! Manual smoke-test endpoints for the AI model and webhook wiring.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::llm_client::prompts::{EXTRACT_SKILLS_PROMPT_TEMPLATE, EXTRACT_SKILLS_TEMPERATURE};
use crate::matching::extractor::parse_skill_list;
use crate::models::Feedback;
use crate::state::AppState;

const SAMPLE_DESCRIPTION: &str =
    "We are looking for a React developer with TypeScript experience and knowledge of Node.js";

fn sample_feedback() -> Value {
    json!({
        "raw": "The candidate demonstrates excellent technical skills with strong problem-solving abilities. They communicate clearly and show high confidence throughout the interview. Their motivation is genuine and they align well with our company values. The candidate provides specific examples of their achievements and shows strong leadership potential. Overall, this is an outstanding candidate who would be a valuable addition to our team.",
        "confidence": "The candidate presents themselves with a high level of confidence. Their tone is assertive and they share specific accomplishments with quantifiable impact.",
        "motivation": "The candidate conveys genuine enthusiasm for the role and company mission. They articulate a clear vision for their career goals.",
        "communication": "The candidate communicates exceptionally clearly and concisely. They structure their responses well and articulate complex technical concepts effectively.",
        "final_assessment": "The candidate presents as an outstanding individual with excellent technical skills and a positive, professional attitude. They are highly suitable for the role."
    })
}

/// GET /api/test-ai
///
/// Calls the model directly, bypassing the keyword fallback, so a broken
/// integration shows up as a 500.
pub async fn handle_test_ai(State(state): State<AppState>) -> Response {
    let prompt = EXTRACT_SKILLS_PROMPT_TEMPLATE.replace("{description}", SAMPLE_DESCRIPTION);
    match state.model.generate(&prompt, EXTRACT_SKILLS_TEMPERATURE).await {
        Ok(text) => Json(json!({
            "success": true,
            "skills": parse_skill_list(&text),
            "message": "AI integration is working correctly",
        }))
        .into_response(),
        Err(e) => {
            warn!("AI test failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": "AI integration failed",
                })),
            )
                .into_response()
        }
    }
}

/// POST /api/test-feedback
pub async fn handle_test_feedback(State(state): State<AppState>) -> Json<Value> {
    let sample = sample_feedback();
    let review = state
        .enricher
        .analyze_feedback(Feedback::from_value(&sample))
        .await;
    Json(json!({
        "success": true,
        "feedback_analysis": review,
        "test_feedback": sample,
    }))
}

/// POST /api/test-webhook
///
/// Echoes whatever JSON it receives.
pub async fn handle_test_webhook(Json(body): Json<Value>) -> Json<Value> {
    info!("Test webhook received: {body}");
    Json(json!({
        "success": true,
        "message": "Test webhook received successfully",
        "received_data": body,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
