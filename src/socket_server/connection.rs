//! WebSocket connection handler
//!
//! One task per browser connection. Frames are processed strictly in arrival
//! order and each selection is handed to the sink before the next frame is
//! read, so one connection never has two writes in flight.

use std::sync::Arc;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use crate::socket_server::protocol::{decode_frame, IngressEvent, PointerMessage};
use crate::socket_server::status::IngressStats;
use crate::socket_server::SelectionSink;

/// Handle a single WebSocket connection until it closes
pub async fn handle_connection<S: SelectionSink>(
    stream: TcpStream,
    sink: Arc<S>,
    stats: Arc<IngressStats>,
) {
    let addr = stream.peer_addr().ok();

    // Accept WebSocket handshake
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake with {:?} failed: {}", addr, e);
            return;
        }
    };

    // Create connection state
    let mut conn = ConnectionState::new(ws_stream, sink, stats);
    tracing::info!(
        "Browser extension connected ({} from {:?})",
        conn.client_id,
        addr
    );
    conn.stats.connection_opened(&conn.client_id);

    conn.run().await;

    conn.stats.connection_closed(&conn.client_id);
    tracing::info!("Browser extension disconnected ({})", conn.client_id);
}

/// State for a single connection
struct ConnectionState<S> {
    ws: WebSocketStream<TcpStream>,
    sink: Arc<S>,
    stats: Arc<IngressStats>,
    client_id: String,
}

impl<S: SelectionSink> ConnectionState<S> {
    fn new(ws: WebSocketStream<TcpStream>, sink: Arc<S>, stats: Arc<IngressStats>) -> Self {
        // Short random client id
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            ws,
            sink,
            stats,
            client_id: format!("ext_{}", &id[..8]),
        }
    }

    async fn run(&mut self) {
        while let Some(msg) = self.ws.next().await {
            match msg {
                Ok(Message::Text(text)) => self.process(&text).await,
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => self.process(&text).await,
                    Err(e) => tracing::warn!(
                        "Dropping non UTF-8 binary frame from {}: {}",
                        self.client_id,
                        e
                    ),
                },
                Ok(Message::Ping(data)) => {
                    let _ = self.ws.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("Client {} requested close", self.client_id);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::info!("Connection {} lost: {}", self.client_id, e);
                    break;
                }
            }
        }
    }

    /// Handle one frame; failures are logged and the frame is dropped
    async fn process(&mut self, text: &str) {
        if let Err(e) = self.handle_frame(text).await {
            tracing::warn!("Dropping message from {}: {:#}", self.client_id, e);
        }
    }

    async fn handle_frame(&mut self, text: &str) -> anyhow::Result<()> {
        let event = decode_frame(text).context("failed to decode pointer message")?;

        match event {
            IngressEvent::Selected(elements) => {
                tracing::info!(
                    "Received element-selected from {} ({} element(s))",
                    self.client_id,
                    elements.len()
                );
                self.stats.record_elements(elements.len());
                self.sink.apply_selection(elements).await;
            }
            IngressEvent::Cleared => {
                tracing::info!("Received element-cleared from {}", self.client_id);
                self.sink.apply_selection(Vec::new()).await;
            }
            IngressEvent::Probe { ping } => {
                tracing::debug!("Connection test from {} (ping: {})", self.client_id, ping);
                let reply = PointerMessage::status(&self.stats.snapshot());
                let json = serde_json::to_string(&reply).context("failed to encode status")?;
                self.ws
                    .send(Message::Text(json))
                    .await
                    .context("failed to send status reply")?;
            }
            IngressEvent::Status(status) => {
                tracing::debug!("Status report from {}: {:?}", self.client_id, status);
            }
        }

        Ok(())
    }
}
