//! MCP Pointer: let an AI assistant see the DOM element you point at
//!
//! A small local relay between a browser extension and an MCP client:
//!
//! ```text
//! browser extension ──ws──► socket_server ──► shared_state ◄── mcp_server ◄──stdio── AI tool
//! ```
//!
//! - [`socket_server`] accepts the extension's WebSocket connection. Several
//!   relays may run on one machine; they elect a leader by contending for
//!   the port, and only the leader accepts connections.
//! - [`shared_state`] keeps the current selection in one file shared by all
//!   instances, replaced atomically on every write.
//! - [`mcp_server`] answers `get-pointed-element` and
//!   `get-pointed-elements-by-index` tool calls from that file.
//! - [`commands::start`] wires everything together and owns shutdown.
//!
//! # Example
//!
//! ```no_run
//! use mcp_pointer::{RelayConfig, commands::run_relay};
//!
//! # async fn demo() -> mcp_pointer::Result<()> {
//! let config = RelayConfig::from_env()?;
//! run_relay(config).await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs_utils;
pub mod mcp_server;
pub mod schema;
pub mod shared_state;
pub mod socket_server;

// Re-export commonly used types
pub use config::{IngressConfig, RelayConfig};
pub use error::{PointerError, Result};
pub use mcp_server::PointerServer;
pub use schema::{ComponentInfo, ElementPosition, Selection, ServerStatus, TargetedElement};
pub use shared_state::SharedStateStore;
pub use socket_server::{IngressHandle, IngressListener, Role, SelectionSink};
