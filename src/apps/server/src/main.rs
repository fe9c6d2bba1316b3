use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aria_core::{
    HttpCompletionClient, InMemoryMemoryIndex, Orchestrator, OrchestratorConfig,
};
use aria_server::{build_registry, build_router, AppState};

const DEFAULT_BIND: &str = "127.0.0.1:8600";
const DEFAULT_COMPLETION_URL: &str = "http://127.0.0.1:11434/v1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("ARIA_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind = std::env::var("ARIA_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let completion_url =
        std::env::var("ARIA_COMPLETION_URL").unwrap_or_else(|_| DEFAULT_COMPLETION_URL.to_string());
    let completion_key = std::env::var("ARIA_COMPLETION_KEY").ok();
    let completion_model = std::env::var("ARIA_COMPLETION_MODEL").ok();

    let memory = Arc::new(InMemoryMemoryIndex::new());
    let completion = Arc::new(HttpCompletionClient::new(
        completion_url.clone(),
        completion_key,
        completion_model.clone(),
    ));

    let registry = Arc::new(build_registry(memory.clone()).context("build tool registry")?);
    tracing::info!(
        tools = registry.len(),
        completion_url = %completion_url,
        "Aria core initialized"
    );

    let config = OrchestratorConfig {
        completion_model,
        ..OrchestratorConfig::default()
    };
    let orchestrator = Arc::new(Orchestrator::new(registry, completion, memory, config));

    let app = build_router(AppState { orchestrator });
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {}", bind))?;
    tracing::info!(%bind, "Aria server listening");

    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
