//! Component wiring and the main run loop

use super::background_tasks::start_session_sweeper;
use super::config::AppConfig;
use anyhow::{Context, Result};
use parley_channels::{DiscordAdapter, DiscordConfig};
use parley_core::{
    load_identity, wait_for_shutdown_signal, AgentEngine, FileSessionStore, MessageRouter,
    SessionCache, ShutdownController,
};
use parley_llm::{LlmProvider, ModelSelector};
use parley_memory::MemoryStore;
use parley_tools::{register_memory_tools, ToolRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Build the stores, tools, engine and router over `provider`.
///
/// Returns the router and the session cache the sweeper needs.
async fn build_router(
    config: &AppConfig,
    data_dir: &Path,
    provider: Arc<dyn LlmProvider>,
    model: &str,
) -> (Arc<MessageRouter>, Arc<SessionCache>) {
    let system_prompt = load_identity(&config.identity_path()).await;

    let memory = Arc::new(MemoryStore::new(data_dir));
    let mut registry = ToolRegistry::new();
    register_memory_tools(&mut registry, memory.clone());
    info!(tools = registry.len(), "Tool registry ready");

    let engine = AgentEngine::new(provider, Arc::new(registry), system_prompt.clone())
        .with_model(model)
        .with_max_iterations(config.llm.max_iterations);

    let store = FileSessionStore::new(data_dir).with_max_messages(config.session.max_messages);
    let sessions = Arc::new(
        SessionCache::new(Arc::new(store))
            .with_expiry(Duration::from_secs(config.session.expiry_secs)),
    );

    let router = Arc::new(MessageRouter::new(
        config.router_config(system_prompt),
        sessions.clone(),
        memory,
        Arc::new(engine),
    ));
    (router, sessions)
}

fn gateway_failure(
    result: std::result::Result<parley_channels::Result<()>, tokio::task::JoinError>,
) -> Option<anyhow::Error> {
    match result {
        Ok(Ok(())) => {
            info!("Discord gateway closed");
            None
        }
        Ok(Err(e)) => {
            error!(error = %e, "Discord adapter failed");
            Some(anyhow::Error::new(e).context("Discord adapter failed"))
        }
        Err(e) => {
            error!(error = %e, "Discord adapter task failed");
            Some(anyhow::Error::new(e).context("Discord adapter task failed"))
        }
    }
}

/// Run the bot until Ctrl+C or SIGTERM
pub async fn run(config: AppConfig) -> Result<()> {
    let data_dir = config.data_dir();
    parley_memory::fs::ensure_private_dir(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let selector = ModelSelector::parse(&config.llm.model).context("Invalid model selector")?;
    let provider = selector
        .build_provider(config.llm.api_key.as_deref(), config.llm_timeout())
        .context("Failed to configure LLM provider")?;
    info!(model = %selector, data_dir = %data_dir.display(), "Starting Parley");

    let (router, sessions) =
        build_router(&config, &data_dir, Arc::new(provider), &selector.model).await;

    let shutdown = ShutdownController::new();
    let sweeper = start_session_sweeper(&config, &sessions, &shutdown);

    let adapter = Arc::new(DiscordAdapter::new(DiscordConfig::new(
        config.discord.token.clone(),
    )));
    let gateway_token = shutdown.token();
    let mut gateway = tokio::spawn(adapter.run(router, gateway_token));

    let mut gateway_error = None;
    tokio::select! {
        _ = wait_for_shutdown_signal() => {}
        result = &mut gateway => {
            gateway_error = gateway_failure(result);
        }
    }

    shutdown.shutdown();
    if let Err(e) = sweeper.await {
        error!(error = %e, "Session sweeper task failed");
    }
    if !gateway.is_finished() {
        gateway_error = gateway_failure(gateway.await);
    }

    if let Some(e) = gateway_error {
        return Err(e);
    }
    info!("Parley stopped");
    Ok(())
}
