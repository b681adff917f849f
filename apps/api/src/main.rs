mod cache;
mod career;
mod config;
mod errors;
mod gateway;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::CallOrchestrator;
use crate::llm_client::GroqClient;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Agragrati API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize inference transport and the gateway in front of it
    let transport = GroqClient::new(config.groq_api_url.clone(), config.groq_api_key.clone())?;
    let gateway = CallOrchestrator::new(Arc::new(transport), config.gateway());
    info!(
        "Inference gateway initialized (model: {}, timeout: {:?}, max_retries: {}, workers: {})",
        config.model, config.ai_timeout, config.max_retries, config.worker_pool_size
    );

    // Build app state (owns one cache per use case)
    let state = AppState::new(gateway, config.clone());
    info!(
        "Caches initialized: analysis ttl {:?}, interview ttl {:?}, insights ttl {:?}, max {} entries",
        config.analysis_cache_ttl,
        config.interview_cache_ttl,
        config.insights_cache_ttl,
        config.cache_max_entries
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
