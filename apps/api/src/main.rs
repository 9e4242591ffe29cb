mod analysis;
mod config;
mod errors;
mod export;
mod extraction;
mod llm_client;
mod reconcile;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::LlmAnalyzer;
use crate::config::Config;
use crate::export::{PageLayout, PdfExporter};
use crate::extraction::LocalExtractor;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::{Orchestrator, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let retry_policy = RetryPolicy {
        max_attempts: config.llm_max_attempts,
        base_delay: Duration::from_millis(config.llm_backoff_ms),
    };
    let llm = LlmClient::new(config.anthropic_api_key.clone(), retry_policy)?;
    info!(
        "LLM client initialized (model: {}, max attempts: {})",
        llm_client::MODEL,
        retry_policy.max_attempts
    );

    // Wire collaborators into the orchestrator
    let store = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
    let orchestrator = Orchestrator::new(
        Arc::new(LocalExtractor),
        Arc::new(LlmAnalyzer::new(llm)),
        Arc::new(PdfExporter::new(PageLayout::default(), "Resume")),
        store,
        chrono::Duration::milliseconds(config.highlight_ms),
    );
    info!(
        "Sessions expire after {} idle minutes; highlight lasts {}ms",
        config.session_ttl_minutes, config.highlight_ms
    );

    let state = AppState {
        orchestrator,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
