use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row of the `interviews` table as selected by the store.
/// Every column is read as text so that json, jsonb and text schemas all decode.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: String,
    pub candidate_name: Option<String>,
    pub skills: Option<String>,
    pub feedback: Option<String>,
    pub transcript: Option<String>,
    pub email: Option<String>,
    pub resume: Option<String>,
}

/// A candidate record, normalized once after it leaves the database.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Raw comma-separated skills string.
    pub skills: String,
    pub feedback: Option<Feedback>,
    pub transcript: String,
    pub email: String,
    /// Resume reference: a URL, a data URI, or a nested JSON object holding them.
    pub resume: Option<Value>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate {
            id: row.id,
            name: row
                .candidate_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unnamed".to_string()),
            skills: row.skills.unwrap_or_default(),
            feedback: Feedback::from_stored_text(row.feedback.as_deref()),
            transcript: row.transcript.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            resume: parse_resume_field(row.resume.as_deref()),
        }
    }
}

/// Interview feedback: either free text or a flat key/value assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feedback {
    RawText(String),
    Structured(BTreeMap<String, String>),
}

impl Feedback {
    /// Parses a stored column value. JSON text is decoded first; anything else is raw text.
    pub fn from_stored_text(text: Option<&str>) -> Option<Self> {
        let text = text?.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Some(Feedback::RawText(text.to_string())),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                match serde_json::from_str::<Value>(s) {
                    Ok(Value::Object(map)) => Self::structured(&map),
                    _ => Some(Feedback::RawText(s.to_string())),
                }
            }
            Value::Object(map) => Self::structured(map),
            other => Some(Feedback::RawText(other.to_string())),
        }
    }

    fn structured(map: &serde_json::Map<String, Value>) -> Option<Self> {
        if map.is_empty() {
            return None;
        }
        let entries = map
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect();
        Some(Feedback::Structured(entries))
    }

    /// Canonical serialization used to deduplicate and cache AI calls.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.prompt_text())
    }

    /// Text sent to the model. Structured feedback prefers its `raw` entry.
    pub fn prompt_text(&self) -> String {
        match self {
            Feedback::RawText(text) => text.clone(),
            Feedback::Structured(entries) => {
                if let Some(raw) = entries.get("raw").filter(|r| !r.trim().is_empty()) {
                    return raw.clone();
                }
                entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.replace('_', " ").to_uppercase(), v))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
    }

    /// Human-readable rendering for reports: one `Key Name: value` line per entry.
    pub fn display_text(&self) -> String {
        match self {
            Feedback::RawText(text) => text.clone(),
            Feedback::Structured(entries) => entries
                .iter()
                .map(|(k, v)| format!("{}: {}", title_case(&k.replace('_', " ")), v))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps JSON objects/arrays structured; any other text becomes a JSON string.
pub fn parse_resume_field(text: Option<&str>) -> Option<Value> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        Ok(Value::String(s)) if !s.trim().is_empty() => Some(Value::String(s)),
        _ => Some(Value::String(text.to_string())),
    }
}

/// A candidate with at least one matched job skill.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedCandidate {
    pub candidate_name: String,
    pub match_count: usize,
    /// Sorted ascending; always a subset of the job skills.
    pub matched_skills: Vec<String>,
    pub all_skills: Vec<String>,
    pub feedback: Option<Feedback>,
    pub transcript: String,
    pub email: String,
    pub resume: Option<Value>,
}

/// A matched candidate after AI enrichment and resume fetching.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCandidate {
    pub candidate_name: String,
    pub match_count: usize,
    pub matched_skills: Vec<String>,
    pub summary: String,
    pub feedback_review: String,
    pub transcript: String,
    pub feedback: Option<Feedback>,
    pub email: String,
    pub cv_resume: Option<Value>,
    pub has_resume_pdf: bool,
    #[serde(skip)]
    pub resume_pdf: Option<Bytes>,
}
