//! Webhook server runtime
//!
//! Wires configuration into the search client, completion backend and
//! orchestrator, then serves the webhook router until SIGTERM/SIGINT.

use crate::config::Config;
use crate::orchestrator::{Orchestrator, OrchestratorSettings};
use crate::providers::{LlmProvider, ProviderFactory};
use crate::search::{GoogleSearchClient, SearchClient};
use crate::session::SessionStore;
use crate::webhook::{AppState, create_router};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

const MEMORY_WARNING_THRESHOLD_MB: u64 = 200;
const MEMORY_CHECK_INTERVAL_SECS: u64 = 60;

/// Runs the webhook server until a shutdown signal arrives.
pub async fn run_server(config: &Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting finbot webhook server"
    );

    let orchestrator = build_orchestrator(config)?;
    let sessions = Arc::clone(orchestrator.sessions());
    let app = create_router(AppState::new(orchestrator));

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Webhook server listening");

    let (memory_shutdown_tx, memory_shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let monitor_handle = tokio::spawn(monitor_memory(sessions, memory_shutdown_rx));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    info!("Starting graceful shutdown sequence...");
    let _ = memory_shutdown_tx.send(()).await;
    match tokio::time::timeout(std::time::Duration::from_secs(5), monitor_handle).await {
        Ok(Ok(())) => debug!("Memory monitoring task stopped"),
        Ok(Err(e)) => error!("Memory monitoring task panicked: {}", e),
        Err(_) => error!("Memory monitoring task did not stop within 5s"),
    }

    info!("Webhook server stopped gracefully");
    Ok(())
}

/// Builds the orchestrator and its backends from a validated configuration.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    config.validate().context("Invalid configuration")?;

    let search: Arc<dyn SearchClient> = Arc::new(
        GoogleSearchClient::try_from_config(&config.search)
            .context("Failed to create search client")?,
    );

    let provider = create_provider(config)?;
    let model = config
        .provider_config
        .as_ref()
        .map(|pc| pc.default_model().to_string())
        .unwrap_or_else(|| provider.default_model());
    info!(
        provider = provider.provider_name(),
        model = %model,
        "Completion backend initialized"
    );

    let settings = OrchestratorSettings::from_config(&config.assistant, model);
    Ok(Orchestrator::new(
        Arc::new(SessionStore::new()),
        search,
        provider,
        settings,
    ))
}

fn create_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    let provider_config = config
        .provider_config
        .clone()
        .context("No completion backend configured")?;
    debug!(provider_type = %provider_config.provider_type(), "Creating completion backend");

    let provider_type = provider_config.provider_type();
    ProviderFactory::create(provider_config)
        .map(Arc::from)
        .with_context(|| format!("Failed to create {} provider", provider_type))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, initiating graceful shutdown...");
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT, initiating graceful shutdown...");
                    }
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to set up signal handlers: {}. Falling back to Ctrl+C", e);
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Periodically logs process memory and the number of live sessions.
///
/// Sessions are never evicted, so this is the only signal of their growth.
async fn monitor_memory(sessions: Arc<SessionStore>, mut shutdown_rx: tokio::sync::mpsc::Receiver<()>) {
    use sysinfo::{System, get_current_pid};

    let mut system = System::new_all();
    let current_pid = match get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            error!(
                "Failed to get current PID for memory monitoring: {}. Memory monitoring disabled.",
                e
            );
            return;
        }
    };
    let mut interval =
        tokio::time::interval(tokio::time::Duration::from_secs(MEMORY_CHECK_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                system.refresh_all();
                let session_count = sessions.session_count().await;
                if let Some(process) = system.process(current_pid) {
                    let memory_mb = process.memory() / (1024 * 1024);
                    if memory_mb > MEMORY_WARNING_THRESHOLD_MB {
                        warn!(memory_mb = memory_mb, threshold_mb = MEMORY_WARNING_THRESHOLD_MB, sessions = session_count, "Memory usage exceeds threshold");
                    } else {
                        debug!(memory_mb = memory_mb, sessions = session_count, "Current memory usage");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Memory monitoring task received shutdown signal");
                break;
            }
        }
    }
}
