//! Skill Extractor: asks the model for a comma-separated skill list and
//! falls back to a static keyword scan when the call fails.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::llm_client::prompts::{EXTRACT_SKILLS_PROMPT_TEMPLATE, EXTRACT_SKILLS_TEMPERATURE};
use crate::llm_client::TextModel;

/// Skills recognised by the offline fallback scan.
#[rustfmt::skip]
pub const FALLBACK_SKILLS: &[&str] = &[
    "javascript", "react", "typescript", "node.js", "python", "java", "sql", "html", "css",
    "angular", "vue.js", "next.js", "express.js", "mongodb", "postgresql", "mysql", "aws",
    "docker", "kubernetes", "git", "agile", "scrum", "jira", "figma", "adobe creative suite",
    "machine learning", "ai", "data science", "statistics", "excel", "powerpoint", "word",
    "communication", "leadership", "teamwork", "problem solving", "analytical thinking",
    "project management", "customer service", "sales", "marketing", "design", "ux/ui",
];

/// Extracts normalized (trimmed, lowercased, deduplicated) skills from a job description.
/// Never fails: model errors degrade to `fallback_skills`.
pub async fn extract_skills(description: &str, model: &dyn TextModel) -> Vec<String> {
    let prompt = EXTRACT_SKILLS_PROMPT_TEMPLATE.replace("{description}", description);

    match model.generate(&prompt, EXTRACT_SKILLS_TEMPERATURE).await {
        Ok(text) => {
            let skills = parse_skill_list(&text);
            info!("Extracted {} skills from job description", skills.len());
            skills
        }
        Err(e) => {
            warn!("Skill extraction failed, using keyword fallback: {e}");
            fallback_skills(description)
        }
    }
}

/// Splits a comma-separated model reply into normalized skills.
pub fn parse_skill_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Case-insensitive substring scan of the description for known skills.
pub fn fallback_skills(description: &str) -> Vec<String> {
    let haystack = description.to_lowercase();
    FALLBACK_SKILLS
        .iter()
        .filter(|skill| haystack.contains(**skill))
        .map(|skill| skill.to_string())
        .collect()
}
