//! Leader election over the ingress port
//!
//! The listening port is the contended resource. Binding it makes this
//! instance the leader; `AddrInUse` makes it a follower that retries after a
//! fixed interval, forever. Any other bind error is fatal and returned to the
//! caller.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::config::IngressConfig;
use crate::error::{PointerError, Result};
use crate::socket_server::connection::handle_connection;
use crate::socket_server::status::IngressStats;
use crate::socket_server::SelectionSink;

/// Role of this instance with respect to the ingress port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// About to try binding the port
    Candidate,
    /// Port held by someone else; waiting to retry
    Follower,
    /// Port bound; serving the browser extension
    Leader,
}

/// Ingress listener, not yet started
pub struct IngressListener<S> {
    config: IngressConfig,
    sink: Arc<S>,
    stats: Arc<IngressStats>,
    role_tx: watch::Sender<Role>,
}

impl<S: SelectionSink> IngressListener<S> {
    pub fn new(config: IngressConfig, sink: Arc<S>) -> Self {
        let stats = Arc::new(IngressStats::new(config.port));
        let (role_tx, _) = watch::channel(Role::Candidate);
        Self {
            config,
            sink,
            stats,
            role_tx,
        }
    }

    /// Spawn the election loop in the background and return immediately
    pub fn start(self) -> IngressHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let role_rx = self.role_tx.subscribe();
        let stats = Arc::clone(&self.stats);
        let task = tokio::spawn(self.run(shutdown_rx));

        IngressHandle {
            role_rx,
            stats,
            shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let outcome = match self.campaign(&mut shutdown).await {
            Ok(Some(listener)) => {
                self.serve(listener, &mut shutdown).await;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                tracing::error!("Failed to start WebSocket server: {}", e);
                Err(e)
            }
        };

        self.stats.mark_stepped_down();
        self.role_tx.send_replace(Role::Candidate);
        outcome
    }

    /// Try to bind until leadership is won, shutdown is requested, or a
    /// non-contention error occurs
    async fn campaign(&self, shutdown: &mut watch::Receiver<bool>) -> Result<Option<TcpListener>> {
        let addr = self.config.address();
        let mut announced_follower = false;

        loop {
            if *shutdown.borrow() {
                return Ok(None);
            }

            match TcpListener::bind(&addr).await {
                Ok(listener) => {
                    self.stats.mark_leader();
                    self.role_tx.send_replace(Role::Leader);
                    tracing::info!(
                        "This instance is now the LEADER (WebSocket server active on ws://{})",
                        addr
                    );
                    return Ok(Some(listener));
                }
                Err(e) if e.kind() == ErrorKind::AddrInUse => {
                    self.role_tx.send_replace(Role::Follower);
                    if announced_follower {
                        tracing::debug!("Port {} still busy, retrying", self.config.port);
                    } else {
                        tracing::info!(
                            "Running as FOLLOWER (port {} busy, retrying every {:?})",
                            self.config.port,
                            self.config.retry_interval
                        );
                        announced_follower = true;
                    }
                }
                Err(source) => return Err(PointerError::Bind { addr, source }),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.retry_interval) => {}
                _ = shutdown.changed() => return Ok(None),
            }
        }
    }

    /// Accept connections until shutdown; the listening socket is closed on return
    async fn serve(&self, listener: TcpListener, shutdown: &mut watch::Receiver<bool>) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                // Accept the next browser connection
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        tracing::debug!("Accepted connection from {}", addr);
                        connections.spawn(handle_connection(
                            stream,
                            Arc::clone(&self.sink),
                            Arc::clone(&self.stats),
                        ));
                    }
                    Err(e) => pause_after_accept_error(&e).await,
                },
                // Reap finished connection tasks
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.changed() => break,
            }
        }

        // Drop clients first, then free the port for the next candidate
        connections.abort_all();
        drop(listener);
        tracing::info!("WebSocket server on port {} stopped", self.config.port);
    }
}

/// Wait applied after a failed `accept` (e.g. EMFILE) before trying again
pub(crate) const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

async fn pause_after_accept_error(error: &std::io::Error) {
    tracing::error!("Failed to accept connection: {}", error);
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Handle to a running ingress listener
pub struct IngressHandle {
    role_rx: watch::Receiver<Role>,
    stats: Arc<IngressStats>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<Result<()>>>,
}

impl IngressHandle {
    /// Current role
    pub fn role(&self) -> Role {
        *self.role_rx.borrow()
    }

    pub fn stats(&self) -> Arc<IngressStats> {
        Arc::clone(&self.stats)
    }

    /// Wait until the listener reports `role`. Returns false if the listener
    /// exited first.
    pub async fn wait_for_role(&mut self, role: Role) -> bool {
        self.role_rx.wait_for(|current| *current == role).await.is_ok()
    }

    /// Resolve only when the listener dies with an error.
    ///
    /// A listener that stops cleanly (or was already stopped) never resolves,
    /// which makes this usable as a `select!` branch.
    pub async fn fatal_error(&mut self) -> PointerError {
        let Some(task) = self.task.as_mut() else {
            return std::future::pending().await;
        };
        let outcome = task.await;
        self.task = None;

        match outcome {
            Ok(Err(e)) => e,
            Ok(Ok(())) => std::future::pending().await,
            Err(e) => {
                tracing::error!("Ingress listener task aborted: {}", e);
                std::future::pending().await
            }
        }
    }

    /// Close the listening socket and wait for the listener to finish
    pub async fn stop(&mut self) -> Result<()> {
        self.shutdown_tx.send_replace(true);
        match self.task.take() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Ingress listener task aborted: {}", e);
                    Ok(())
                }
            },
            None => Ok(()),
        }
    }
}

impl Drop for IngressHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}
