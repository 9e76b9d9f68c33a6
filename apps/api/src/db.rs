use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the connection pool for the hosted candidate database.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to the candidate database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    info!("Candidate database pool established");
    Ok(pool)
}
