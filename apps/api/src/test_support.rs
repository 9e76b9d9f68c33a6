//! Shared fakes for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::{LlmError, TextModel};
use crate::models::Candidate;
use crate::state::AppState;
use crate::store::InterviewStore;

type Responder = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// A `TextModel` that answers from a closure and records every prompt.
pub struct ScriptedModel {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn with<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    /// Answers skill extraction with `skills_reply`, summaries with `"summary"`
    /// and feedback reviews with a suitable verdict.
    pub fn recruiter(skills_reply: &str) -> Self {
        let skills_reply = skills_reply.to_string();
        Self::with(move |prompt| {
            if prompt.contains("extract ALL relevant skills") {
                Ok(skills_reply.clone())
            } else if prompt.contains("skill summary") {
                Ok("summary".to_string())
            } else {
                Ok("✅ Suitable based on feedback".to_string())
            }
        })
    }

    pub fn failing() -> Self {
        Self::with(|_| {
            Err(LlmError::Api {
                status: 503,
                message: "model unavailable".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, prompt: &str, _temperature: f32) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

/// In-memory `InterviewStore`.
#[derive(Default)]
pub struct InMemoryStore {
    pub candidates: Vec<Candidate>,
    pub emails: Mutex<Vec<String>>,
    pub fail: bool,
}

impl InMemoryStore {
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl InterviewStore for InMemoryStore {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self.candidates.clone())
    }

    async fn record_incoming_email(&self, email: &str) -> Result<(), sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.emails.lock().unwrap().push(email.to_string());
        Ok(())
    }
}

pub fn candidate(name: &str, skills: &str) -> Candidate {
    Candidate {
        id: name.to_lowercase(),
        name: name.to_string(),
        skills: skills.to_string(),
        feedback: None,
        transcript: String::new(),
        email: format!("{}@example.com", name.to_lowercase()),
        resume: None,
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgres://localhost/interviews".to_string(),
        ),
        (
            "GOOGLE_GENERATIVE_AI_API_KEY".to_string(),
            "test-key".to_string(),
        ),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(move |key| vars.get(key).cloned()).expect("test config must load")
}

pub fn test_state(store: Arc<dyn InterviewStore>, model: Arc<dyn TextModel>) -> AppState {
    AppState::build(test_config(&[]), store, model)
}
