mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod scraper;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scraper::ScrapeClient;
use crate::state::AppState;
use crate::workflow::driver::{LiveSteps, WorkflowDriver};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SocialForge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize service clients
    let llm = LlmClient::with_base_url(
        config.gemini_api_key.clone(),
        config.http_timeout_secs,
        &config.gemini_base_url,
    )?;
    info!(
        "LLM client initialized (analysis: {}, copy: {}, image: {})",
        llm_client::ANALYSIS_MODEL,
        llm_client::COPY_MODEL,
        llm_client::IMAGE_MODEL
    );
    if !llm.has_api_key() {
        warn!("GEMINI_API_KEY is not set; every generation step will fail");
    }

    let scraper = ScrapeClient::with_base_url(
        config.apify_api_token.clone(),
        config.http_timeout_secs,
        Duration::from_millis(config.sample_delay_ms),
        &config.apify_base_url,
    )?;
    info!("Scrape client initialized (actor: {})", crate::scraper::ACTOR_ID);
    if !scraper.has_token() {
        warn!("APIFY_API_TOKEN is not set; scraping falls back to sample data");
    }

    // Build app state
    let workflow = Arc::new(WorkflowDriver::new(Arc::new(LiveSteps::new(scraper, llm))));
    let state = AppState {
        workflow,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
