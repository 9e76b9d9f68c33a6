//! Deterministic stand-ins used when an AI call fails.

pub const NO_FEEDBACK_REVIEW: &str = "⚠️ Warning: Some concerns found - No feedback data available.";

pub const SUITABLE_REVIEW: &str = "✅ Suitable based on feedback - Strong positive indicators across multiple assessment categories including technical skills, communication, and professional attitude. The candidate demonstrates excellent capabilities and would be a valuable addition to the team.";

pub const NOT_SUITABLE_REVIEW: &str = "❌ Not suitable based on feedback - Multiple concerning indicators across various assessment areas including technical limitations, communication issues, and professional concerns. The candidate would not be a good fit for the role.";

pub const MIXED_REVIEW: &str = "⚠️ Warning: Some concerns found - Mixed feedback with both positive and negative aspects. While the candidate shows potential in some areas, there are specific concerns that need to be addressed before considering them suitable for the role.";

const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent",
    "outstanding",
    "exceptional",
    "strong",
    "highly suitable",
    "demonstrates strong",
    "excellent technical",
    "clear communication",
    "high confidence",
    "positive attitude",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "poor",
    "limited",
    "struggles",
    "weak",
    "concerns",
    "problems",
    "difficulty",
    "lack of",
    "not suitable",
    "significant concerns",
    "poor technical",
    "communication problems",
];

/// Keyword-count classification of feedback text.
/// A verdict needs at least three hits and more hits than the opposite list.
pub fn classify_feedback(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let positive = POSITIVE_KEYWORDS.iter().filter(|k| text.contains(**k)).count();
    let negative = NEGATIVE_KEYWORDS.iter().filter(|k| text.contains(**k)).count();

    if positive > negative && positive >= 3 {
        SUITABLE_REVIEW
    } else if negative > positive && negative >= 3 {
        NOT_SUITABLE_REVIEW
    } else {
        MIXED_REVIEW
    }
}

/// Template summary naming the first five skills.
pub fn skill_summary(skills: &[String]) -> String {
    let head: Vec<&str> = skills.iter().take(5).map(String::as_str).collect();
    let rest = if skills.len() > 5 {
        format!("{} other areas", skills.len() - 5)
    } else {
        "various domains".to_string()
    };
    format!(
        "Experienced professional with comprehensive skills in {} and additional expertise in {}.",
        head.join(", "),
        rest
    )
}
