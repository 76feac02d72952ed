//! Relay orchestration
//!
//! Startup order:
//! 1. Shared state store (plain file, no I/O yet)
//! 2. Ingress listener, spawned in the background. Being a follower forever
//!    is a normal steady state, so nothing waits on it.
//! 3. MCP server on stdio. This is the one capability that must come up:
//!    startup blocks on its initialization and any failure ends the process.
//!
//! Whatever ends the run (stdin closed, SIGINT/SIGTERM, fatal bind error),
//! the ingress socket is closed before returning so the next candidate can
//! take the port.

use std::sync::Arc;
use std::time::Duration;

use rmcp::transport::stdio;
use rmcp::ServiceExt;

use crate::cli::StartArgs;
use crate::config::RelayConfig;
use crate::error::{PointerError, Result};
use crate::mcp_server::PointerServer;
use crate::schema::TargetedElement;
use crate::shared_state::SharedStateStore;
use crate::socket_server::{IngressHandle, IngressListener, SelectionSink};

impl SelectionSink for SharedStateStore {
    async fn apply_selection(&self, elements: Vec<TargetedElement>) {
        if let Err(e) = self.write(&elements).await {
            tracing::error!("Failed to save current element(s): {}", e);
        }
    }
}

/// Run the start command
///
/// This creates a tokio runtime and runs the relay until shutdown.
pub fn run_start(args: Option<&StartArgs>) -> Result<String> {
    let config = match args {
        Some(args) => args.to_config(),
        None => RelayConfig::from_env()?,
    };

    let runtime = tokio::runtime::Runtime::new().map_err(|e| PointerError::QueryService {
        message: format!("Failed to create tokio runtime: {}", e),
    })?;

    let outcome = runtime.block_on(run_relay(config));

    // The stdio reader sits on a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_secs(1));

    outcome.map(|()| String::new())
}

/// Wire the store, the ingress listener and the MCP server, then run until
/// shutdown
pub async fn run_relay(config: RelayConfig) -> Result<()> {
    config.validate()?;

    tracing::info!("Starting mcp-pointer v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Shared state file: {}", config.state_path.display());

    let store = Arc::new(SharedStateStore::new(&config.state_path));
    let mut ingress = IngressListener::new(config.ingress.clone(), Arc::clone(&store)).start();

    let outcome = serve_until_shutdown(store, &mut ingress).await;

    if let Err(e) = ingress.stop().await {
        tracing::debug!("Ingress listener stopped with error: {}", e);
    }

    match &outcome {
        Ok(()) => tracing::info!("mcp-pointer shut down"),
        Err(e) => tracing::error!("mcp-pointer stopped: {}", e),
    }
    outcome
}

async fn serve_until_shutdown(
    store: Arc<SharedStateStore>,
    ingress: &mut IngressHandle,
) -> Result<()> {
    let server = PointerServer::new(store);

    let service = tokio::select! {
        started = server.serve(stdio()) => started.map_err(|e| PointerError::QueryService {
            message: format!("Failed to start MCP server: {}", e),
        })?,
        err = ingress.fatal_error() => return Err(err),
        _ = shutdown_signal() => return Ok(()),
    };

    tracing::info!("MCP Pointer started! Ready to point at elements.");

    tokio::select! {
        quit = service.waiting() => match quit {
            Ok(reason) => {
                tracing::info!("MCP client disconnected ({:?})", reason);
                Ok(())
            }
            Err(e) => Err(PointerError::QueryService {
                message: format!("MCP server error: {}", e),
            }),
        },
        err = ingress.fatal_error() => Err(err),
        _ = shutdown_signal() => Ok(()),
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received interrupt, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
