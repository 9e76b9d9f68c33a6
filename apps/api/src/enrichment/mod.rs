//! Batch AI Enricher: skill summaries and feedback reviews for the top matches.
//!
//! Each batch deduplicates its inputs by a canonical key, answers repeats from
//! the bounded caches, fans the remaining unique calls out concurrently and
//! scatters the results back to every original index. A failed call is
//! replaced by a deterministic fallback and is never cached.

pub mod cache;
pub mod fallback;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::llm_client::prompts::{
    ANALYZE_FEEDBACK_PROMPT_TEMPLATE, ANALYZE_FEEDBACK_TEMPERATURE,
    SUMMARIZE_SKILLS_PROMPT_TEMPLATE, SUMMARIZE_SKILLS_TEMPERATURE,
};
use crate::llm_client::{LlmError, TextModel};
use crate::models::Feedback;

pub use cache::BoundedCache;

/// One distinct input of a batch and every position it occupies.
struct UniqueInput<'a, T> {
    key: String,
    input: &'a T,
    indices: Vec<usize>,
}

fn dedup<'a, T, F>(items: &'a [T], key_of: F) -> Vec<UniqueInput<'a, T>>
where
    F: Fn(&T) -> String,
{
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut uniques: Vec<UniqueInput<'a, T>> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let key = key_of(item);
        match position.get(&key) {
            Some(&slot) => uniques[slot].indices.push(index),
            None => {
                position.insert(key.clone(), uniques.len());
                uniques.push(UniqueInput {
                    key,
                    input: item,
                    indices: vec![index],
                });
            }
        }
    }
    uniques
}

fn scatter<T>(len: usize, uniques: &[UniqueInput<'_, T>], results: Vec<String>) -> Vec<String> {
    let mut out = vec![String::new(); len];
    for (unique, result) in uniques.iter().zip(results) {
        for &index in &unique.indices {
            out[index] = result.clone();
        }
    }
    out
}

/// Canonical key for a skill list: sorted, comma-joined.
pub fn skills_key(skills: &[String]) -> String {
    let mut sorted = skills.to_vec();
    sorted.sort();
    sorted.join(",")
}

pub struct Enricher {
    model: Arc<dyn TextModel>,
    feedback_cache: BoundedCache,
    skill_cache: BoundedCache,
}

impl Enricher {
    pub fn new(model: Arc<dyn TextModel>, cache_capacity: usize) -> Self {
        Self {
            model,
            feedback_cache: BoundedCache::new(cache_capacity),
            skill_cache: BoundedCache::new(cache_capacity),
        }
    }

    /// Returns one review per input, in input order.
    pub async fn analyze_feedback_batch(&self, items: &[Option<Feedback>]) -> Vec<String> {
        let started = Instant::now();
        let uniques = dedup(items, |fb| match fb {
            Some(fb) => fb.cache_key(),
            None => String::new(),
        });

        let results = join_all(uniques.iter().map(|unique| async move {
            let Some(feedback) = unique.input else {
                return fallback::NO_FEEDBACK_REVIEW.to_string();
            };
            let prompt =
                ANALYZE_FEEDBACK_PROMPT_TEMPLATE.replace("{feedback}", &feedback.prompt_text());
            match self
                .resolve(&self.feedback_cache, &unique.key, &prompt, ANALYZE_FEEDBACK_TEMPERATURE)
                .await
            {
                Ok(review) => review,
                Err(e) => {
                    warn!("Feedback analysis failed, using keyword fallback: {e}");
                    fallback::classify_feedback(&feedback.cache_key()).to_string()
                }
            }
        }))
        .await;

        info!(
            "Analyzed feedback for {} candidates ({} unique) in {}ms",
            items.len(),
            uniques.len(),
            started.elapsed().as_millis()
        );
        scatter(items.len(), &uniques, results)
    }

    /// Returns one summary per skill list, in input order.
    pub async fn summarize_skills_batch(&self, lists: &[Vec<String>]) -> Vec<String> {
        let started = Instant::now();
        let uniques = dedup(lists, |skills| skills_key(skills));

        let results = join_all(uniques.iter().map(|unique| async move {
            let mut skills = unique.input.clone();
            skills.sort();
            if skills.is_empty() {
                return fallback::skill_summary(&skills);
            }
            let prompt = SUMMARIZE_SKILLS_PROMPT_TEMPLATE.replace("{skills}", &skills.join(", "));
            match self
                .resolve(&self.skill_cache, &unique.key, &prompt, SUMMARIZE_SKILLS_TEMPERATURE)
                .await
            {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Skill summary failed, using template fallback: {e}");
                    fallback::skill_summary(&skills)
                }
            }
        }))
        .await;

        info!(
            "Summarized skills for {} candidates ({} unique) in {}ms",
            lists.len(),
            uniques.len(),
            started.elapsed().as_millis()
        );
        scatter(lists.len(), &uniques, results)
    }

    /// Single-item convenience over `analyze_feedback_batch`.
    pub async fn analyze_feedback(&self, feedback: Option<Feedback>) -> String {
        self.analyze_feedback_batch(&[feedback])
            .await
            .pop()
            .unwrap_or_else(|| fallback::NO_FEEDBACK_REVIEW.to_string())
    }

    /// Cache lookup, then one model call on a miss. Empty replies count as failures.
    async fn resolve(
        &self,
        cache: &BoundedCache,
        key: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        if let Some(hit) = cache.get(key) {
            debug!("AI cache hit ({} bytes key)", key.len());
            return Ok(hit);
        }

        let text = self.model.generate(prompt, temperature).await?;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        cache.insert(key.to_string(), text.clone());
        Ok(text)
    }
}
