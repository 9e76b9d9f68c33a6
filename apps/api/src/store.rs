//! Candidate Store Access: read-only paginated access to the `interviews`
//! table, plus the `incoming_emails` insert used by the e-mail collector.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::{Candidate, CandidateRow};

const SELECT_CANDIDATES_PAGE: &str = r#"
    SELECT id::text AS id,
           candidate_name::text AS candidate_name,
           skills::text AS skills,
           feedback::text AS feedback,
           transcript::text AS transcript,
           "Email"::text AS email,
           "CV/Resume"::text AS resume
    FROM interviews
    ORDER BY id
    LIMIT $1 OFFSET $2
"#;

/// Storage seam for route handlers. `PgInterviewStore` in production,
/// in-memory fakes in tests.
#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Reads every candidate, one page at a time.
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, sqlx::Error>;

    async fn record_incoming_email(&self, email: &str) -> Result<(), sqlx::Error>;
}

pub struct PgInterviewStore {
    pool: PgPool,
    page_size: i64,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool, page_size: i64) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, sqlx::Error> {
        let mut candidates = Vec::new();
        let mut offset = 0_i64;

        loop {
            let page: Vec<CandidateRow> = sqlx::query_as(SELECT_CANDIDATES_PAGE)
                .bind(self.page_size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

            let fetched = page.len() as i64;
            debug!("Fetched {fetched} candidate rows at offset {offset}");
            candidates.extend(page.into_iter().map(Candidate::from));

            if fetched < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        info!("Loaded {} candidates from the interviews table", candidates.len());
        Ok(candidates)
    }

    async fn record_incoming_email(&self, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO incoming_emails (email, received_at) VALUES ($1, $2)")
            .bind(email)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
