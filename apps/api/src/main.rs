mod config;
mod db;
mod enrichment;
mod errors;
mod extraction;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod report;
mod resume;
mod routes;
mod state;
mod store;
mod webhook;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgInterviewStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast when DATABASE_URL or GOOGLE_API_KEY is missing
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting match API v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgInterviewStore::new(pool, config.candidate_page_size));

    let model = Arc::new(GeminiClient::new(
        reqwest::Client::new(),
        config.google_api_key.clone(),
    ));
    info!("Gemini client initialized (model: {})", llm_client::MODEL);

    let state = AppState::build(config.clone(), store, model);
    info!(
        "JD text extraction via {}, webhook {}",
        state.jd_extractor.name(),
        if state.webhook.is_configured() { "enabled" } else { "disabled" }
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
