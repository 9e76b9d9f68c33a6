//! Match Pipeline: the per-request flow shared by the match and webhook routes.
//!
//! Flow: extract_skills → fetch_candidates → match → top N →
//!       enrich (feedback ∥ summaries ∥ resumes) → render report(s).

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use bytes::Bytes;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::extract_skills;
use crate::models::{EnrichedCandidate, MatchedCandidate};
use crate::report::{render_candidate_reports, render_report, ReportError, ReportSettings};
use crate::state::AppState;

/// How the report is delivered in the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// One PDF for every candidate, returned as `pdf_base64`.
    #[default]
    Combined,
    /// One PDF per candidate, returned as `candidate_pdfs`.
    PerCandidate,
}

impl ReportMode {
    /// Parses a form field value; unknown values are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "combined" => Some(ReportMode::Combined),
            "per_candidate" => Some(ReportMode::PerCandidate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Fetch each candidate's resume PDF and merge it into the report.
    pub include_resumes: bool,
    pub report_mode: ReportMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidatePdf {
    pub candidate_name: String,
    pub pdf_base64: String,
}

/// Response body of `POST /api/match`.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub report_id: Uuid,
    pub candidates: Vec<EnrichedCandidate>,
    pub extracted_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_pdfs: Option<Vec<CandidatePdf>>,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub response: MatchResponse,
    pub total_candidates_found: usize,
    pub matching_candidates_count: usize,
}

/// Runs the full match pipeline for one job description.
///
/// Steps:
/// 1. extract_skills() on description + notes; no skills → 400
/// 2. fetch every candidate; none → 404
/// 3. match; no matches → 404
/// 4. keep the top `TOP_MATCHES`
/// 5. feedback reviews, skill summaries and (optionally) resume PDFs, concurrently
/// 6. render on a blocking thread
pub async fn run_match(
    state: &AppState,
    description: &str,
    extra_notes: &str,
    options: MatchOptions,
) -> Result<MatchOutcome, AppError> {
    let report_id = Uuid::new_v4();

    // Step 1: Extract skills
    let text = format!("{description}\n\n{extra_notes}");
    let skills = extract_skills(&text, state.model.as_ref()).await;
    if skills.is_empty() {
        return Err(AppError::Validation(
            "No skills could be extracted from the job description".to_string(),
        ));
    }

    // Step 2: Load candidates
    let candidates = state.store.fetch_candidates().await?;
    if candidates.is_empty() {
        return Err(AppError::NotFound(
            "No candidates found in database".to_string(),
        ));
    }

    // Step 3: Match
    let mut matches = state.matcher.match_candidates(&skills, &candidates);
    if matches.is_empty() {
        return Err(AppError::NotFound("No matching candidates found".to_string()));
    }
    let matching_candidates_count = matches.len();

    // Step 4: Top N
    matches.truncate(state.config.top_matches.max(1));
    info!(
        "[{report_id}] {} skills, {} candidates, {} matches, enriching top {}",
        skills.len(),
        candidates.len(),
        matching_candidates_count,
        matches.len()
    );

    // Step 5: Enrich
    let enriched = enrich(state, matches, options.include_resumes).await;

    // Step 6: Render
    let settings = ReportSettings {
        max_field_chars: state.config.report_max_field_chars,
    };
    let (pdf_base64, candidate_pdfs) = render(enriched.clone(), settings, options.report_mode).await?;

    Ok(MatchOutcome {
        response: MatchResponse {
            report_id,
            candidates: enriched,
            extracted_skills: skills,
            pdf_base64,
            candidate_pdfs,
        },
        total_candidates_found: candidates.len(),
        matching_candidates_count,
    })
}

async fn enrich(
    state: &AppState,
    matches: Vec<MatchedCandidate>,
    include_resumes: bool,
) -> Vec<EnrichedCandidate> {
    let feedback: Vec<_> = matches.iter().map(|m| m.feedback.clone()).collect();
    let skill_lists: Vec<Vec<String>> = matches.iter().map(|m| m.all_skills.clone()).collect();

    let resumes = async {
        if !include_resumes {
            return vec![None; matches.len()];
        }
        join_all(matches.iter().map(|m| async {
            match &m.resume {
                Some(resume) => state.resumes.fetch_for_resume(resume).await,
                None => None,
            }
        }))
        .await
    };

    let (reviews, summaries, resume_pdfs): (Vec<String>, Vec<String>, Vec<Option<Bytes>>) = tokio::join!(
        state.enricher.analyze_feedback_batch(&feedback),
        state.enricher.summarize_skills_batch(&skill_lists),
        resumes,
    );

    matches
        .into_iter()
        .zip(reviews)
        .zip(summaries)
        .zip(resume_pdfs)
        .map(|(((m, feedback_review), summary), resume_pdf)| EnrichedCandidate {
            candidate_name: m.candidate_name,
            match_count: m.match_count,
            matched_skills: m.matched_skills,
            summary,
            feedback_review,
            transcript: m.transcript,
            feedback: m.feedback,
            email: m.email,
            cv_resume: m.resume,
            has_resume_pdf: resume_pdf.is_some(),
            resume_pdf,
        })
        .collect()
}

async fn render(
    candidates: Vec<EnrichedCandidate>,
    settings: ReportSettings,
    mode: ReportMode,
) -> Result<(Option<String>, Option<Vec<CandidatePdf>>), AppError> {
    let rendered = tokio::task::spawn_blocking(move || match mode {
        ReportMode::Combined => {
            render_report(&candidates, &settings).map(|pdf| (Some(BASE64_STANDARD.encode(pdf)), None))
        }
        ReportMode::PerCandidate => render_candidate_reports(&candidates, &settings).map(|reports| {
            let pdfs = reports
                .into_iter()
                .map(|r| CandidatePdf {
                    candidate_name: r.candidate_name,
                    pdf_base64: BASE64_STANDARD.encode(r.pdf),
                })
                .collect();
            (None, Some(pdfs))
        }),
    })
    .await
    .map_err(|e| ReportError::Task(e.to_string()))??;
    Ok(rendered)
}
