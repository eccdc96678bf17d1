mod brand_voice;
mod config;
mod content;
mod db;
mod errors;
mod extract;
mod jobs;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod store;
mod website;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::INTERRUPTED_MESSAGE;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryRepository, PgRepository, Repository};

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

    info!("Starting Brand Voice API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence: Postgres when configured, process memory otherwise
    let store: Arc<dyn Repository> = match config.database_url.as_deref() {
        Some(url) => Arc::new(PgRepository::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL is not set; using in-memory storage (data is lost on restart)");
            Arc::new(MemoryRepository::new())
        }
    };

    let interrupted = store.fail_unfinished_jobs(INTERRUPTED_MESSAGE).await?;
    if interrupted > 0 {
        warn!("Marked {interrupted} unfinished generation job(s) as failed");
    }

    // Initialize LLM client
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every generation request will fail until it is configured");
    }
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.request_timeout,
    )?;
    info!("LLM client initialized (base URL: {})", config.openai_base_url);

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let state = AppState::new(Arc::new(llm), store, http, config.clone());

    let app = build_router(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
