mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod resume;
mod routes;
mod search;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::ChatClient;
use crate::pipeline::orchestrator::Pipeline;
use crate::pipeline::store::SessionStore;
use crate::routes::build_router;
use crate::search::client::PerplexityJobSource;
use crate::state::AppState;
use crate::tailoring::tailor::OpenAiResumeTailor;

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

    info!("Starting AutoApply API v{}", env!("CARGO_PKG_VERSION"));

    if config.perplexity_api_key.is_none() {
        warn!("PERPLEXITY_API_KEY not set; sessions must supply their own search key");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; sessions must supply their own generation key");
    }

    // Provider clients (one HTTP client per provider, shared by all sessions)
    let search_chat = ChatClient::new(&config.perplexity_base_url, config.provider_timeout_secs)?;
    let tailor_chat = ChatClient::new(&config.openai_base_url, config.provider_timeout_secs)?;
    info!(
        "Provider clients initialized (search: {}, generation: {}, timeout {}s)",
        search::prompts::SEARCH_MODEL,
        tailoring::prompts::TAILOR_MODEL,
        config.provider_timeout_secs
    );

    let pipeline = Pipeline::new(
        Arc::new(PerplexityJobSource::new(search_chat)),
        Arc::new(OpenAiResumeTailor::new(tailor_chat)),
    );

    let state = AppState {
        sessions: Arc::new(SessionStore::default()),
        pipeline,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
