//! Ingress socket server
//!
//! Accepts WebSocket connections from the browser extension and turns
//! pointer messages into writes on a [`SelectionSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       IngressListener                            │
//! │                                                                  │
//! │   Candidate ──bind ok──► Leader ──stop──► (socket closed)       │
//! │      │  ▲                                                        │
//! │ in use  retry interval                                           │
//! │      ▼  │                                                        │
//! │   Follower                                                       │
//! │                                                                  │
//! │   Leader: accept loop ──► handle_connection (one task per socket)│
//! │             frames decoded in order ──► SelectionSink            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Several relay processes may run on one machine (one per AI tool
//! session). They all contend for the same port; whoever binds it is the
//! leader and bridges the browser, the others retry on a fixed interval.

use std::future::Future;

use crate::schema::TargetedElement;

pub mod connection;
pub mod election;
pub mod protocol;
pub mod status;

pub use connection::handle_connection;
pub use election::{IngressHandle, IngressListener, Role};
pub use protocol::{decode_frame, IngressEvent, MessageType, PointerMessage};
pub use status::IngressStats;

/// Destination of decoded selections
///
/// Implementations absorb their own failures: a sink that cannot persist a
/// selection logs it and returns, it never stops the connection.
pub trait SelectionSink: Send + Sync + 'static {
    /// Replace the current selection; an empty list clears it
    fn apply_selection(&self, elements: Vec<TargetedElement>) -> impl Future<Output = ()> + Send;
}
