//! Skill Matcher: compares extracted job skills with each candidate's
//! comma-separated skills string and ranks candidates by match count.
//!
//! Per (job skill, candidate skill) pair, the first rule that succeeds wins:
//! 1. exact equality
//! 2. the job skill is one whitespace-delimited word of the candidate skill
//! 3. the job skill occurs as a whole word (`\b...\b`) inside the candidate skill
//!
//! Rule 3 is disabled for the configured specific terms.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use crate::models::{Candidate, MatchedCandidate};

/// A normalized job skill with its precompiled whole-word pattern.
struct JobSkill {
    text: String,
    /// `None` for specific terms, which never use boundary matching.
    boundary: Option<Regex>,
}

impl JobSkill {
    fn matches(&self, candidate_skill: &str) -> bool {
        if candidate_skill == self.text {
            return true;
        }
        if candidate_skill.split_whitespace().any(|w| w == self.text) {
            return true;
        }
        self.boundary
            .as_ref()
            .map(|re| re.is_match(candidate_skill))
            .unwrap_or(false)
    }
}

pub struct SkillMatcher {
    specific_terms: HashSet<String>,
}

impl SkillMatcher {
    pub fn new<I, S>(specific_terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            specific_terms: specific_terms
                .into_iter()
                .map(|t| normalize(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Returns candidates with at least one matched skill, highest match count first.
    /// Ties keep the order in which candidates were supplied.
    pub fn match_candidates(
        &self,
        job_skills: &[String],
        candidates: &[Candidate],
    ) -> Vec<MatchedCandidate> {
        let job_skills = self.compile(job_skills);
        if job_skills.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<MatchedCandidate> = candidates
            .iter()
            .filter_map(|candidate| {
                let skills = split_candidate_skills(&candidate.skills);
                let matched: Vec<String> = job_skills
                    .iter()
                    .filter(|job| skills.iter().any(|s| job.matches(s)))
                    .map(|job| job.text.clone())
                    .collect();

                if matched.is_empty() {
                    return None;
                }

                Some(MatchedCandidate {
                    candidate_name: candidate.name.clone(),
                    match_count: matched.len(),
                    matched_skills: matched,
                    all_skills: skills,
                    feedback: candidate.feedback.clone(),
                    transcript: candidate.transcript.clone(),
                    email: candidate.email.clone(),
                    resume: candidate.resume.clone(),
                })
            })
            .collect();

        matches.sort_by(|a, b| b.match_count.cmp(&a.match_count));
        matches
    }

    /// Dedups and sorts the job skills so matched lists come out sorted.
    fn compile(&self, job_skills: &[String]) -> Vec<JobSkill> {
        let unique: BTreeSet<String> = job_skills
            .iter()
            .map(|s| normalize(s))
            .filter(|s| !s.is_empty())
            .collect();

        unique
            .into_iter()
            .map(|text| {
                let boundary = if self.specific_terms.contains(&text) {
                    None
                } else {
                    Regex::new(&format!(r"\b{}\b", regex::escape(&text))).ok()
                };
                JobSkill { text, boundary }
            })
            .collect()
    }
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Splits a raw skills string on commas. Absent or blank input yields no skills.
pub fn split_candidate_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}
