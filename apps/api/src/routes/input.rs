//! Job description input accepted as JSON or as a multipart PDF upload.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::pipeline::ReportMode;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct JsonJobDescription {
    job_description: Option<String>,
    extra_notes: Option<String>,
    report_mode: Option<String>,
}

/// A job description ready for matching.
#[derive(Debug)]
pub struct JobDescriptionInput {
    pub description: String,
    pub extra_notes: String,
    pub report_mode: ReportMode,
}

#[async_trait]
impl FromRequest<AppState> for JobDescriptionInput {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            from_multipart(multipart, state).await
        } else {
            let Json(body) = Json::<JsonJobDescription>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            from_json(body)
        }
    }
}

fn parse_report_mode(value: Option<&str>) -> Result<ReportMode, AppError> {
    ReportMode::parse(value.unwrap_or("")).ok_or_else(|| {
        AppError::Validation("report_mode must be 'combined' or 'per_candidate'".to_string())
    })
}

fn from_json(body: JsonJobDescription) -> Result<JobDescriptionInput, AppError> {
    let description = body.job_description.unwrap_or_default();
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description is required".to_string(),
        ));
    }
    Ok(JobDescriptionInput {
        description,
        extra_notes: body.extra_notes.unwrap_or_default(),
        report_mode: parse_report_mode(body.report_mode.as_deref())?,
    })
}

async fn from_multipart(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<JobDescriptionInput, AppError> {
    let mut file: Option<Bytes> = None;
    let mut extra_notes = String::new();
    let mut report_mode: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?,
                )
            }
            "extra_notes" => {
                extra_notes = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?
            }
            "report_mode" => {
                report_mode = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?,
                )
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::Validation("No PDF file provided".to_string()))?;
    let report_mode = parse_report_mode(report_mode.as_deref())?;

    info!(
        "Extracting job description from uploaded PDF ({} bytes, {})",
        file.len(),
        state.jd_extractor.name()
    );
    let description = match state.jd_extractor.extract_text(file).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Job description extraction failed: {e}");
            return Err(AppError::Validation(
                "Failed to extract text from PDF".to_string(),
            ));
        }
    };

    Ok(JobDescriptionInput {
        description,
        extra_notes,
        report_mode,
    })
}
