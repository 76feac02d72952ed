//! Pointer message wire format
//!
//! Every frame between the browser extension and the relay is one JSON
//! envelope:
//!
//! ```json
//! {"type": "element-selected", "data": {...} | [...], "timestamp": 1700000000000}
//! {"type": "element-cleared", "timestamp": 1700000000000}
//! {"type": "connection-test", "data": {"ping": true}, "timestamp": 1700000000000}
//! {"type": "server-status", "data": {...}, "timestamp": 1700000000000}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PointerError, Result};
use crate::schema::{elements_from_payload, ServerStatus, TargetedElement};

/// Discriminant of a pointer message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    ElementSelected,
    ElementCleared,
    ConnectionTest,
    ServerStatus,
}

/// Wire envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub timestamp: u64,
}

/// Decoded meaning of an inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum IngressEvent {
    /// New selection (possibly empty, which clears)
    Selected(Vec<TargetedElement>),
    Cleared,
    Probe { ping: bool },
    Status(ServerStatus),
}

#[derive(Debug, Deserialize)]
struct ProbePayload {
    #[serde(default)]
    ping: bool,
}

impl PointerMessage {
    /// Parse a raw text frame
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PointerError::MalformedMessage {
            message: e.to_string(),
        })
    }

    /// Build an outbound `server-status` frame
    pub fn status(status: &ServerStatus) -> Self {
        Self {
            kind: MessageType::ServerStatus,
            data: serde_json::to_value(status).ok(),
            timestamp: now_millis(),
        }
    }

    /// Validate the payload against the message type
    pub fn into_event(self) -> Result<IngressEvent> {
        match self.kind {
            MessageType::ElementSelected => {
                let data = self.data.ok_or_else(|| PointerError::MalformedMessage {
                    message: "element-selected without data".to_string(),
                })?;
                if data.is_null() {
                    return Ok(IngressEvent::Cleared);
                }
                let elements = elements_from_payload(data).map_err(|e| {
                    PointerError::MalformedMessage {
                        message: format!("invalid element payload: {}", e),
                    }
                })?;
                Ok(IngressEvent::Selected(elements))
            }
            MessageType::ElementCleared => Ok(IngressEvent::Cleared),
            MessageType::ConnectionTest => {
                let ping = match self.data {
                    Some(data) => {
                        serde_json::from_value::<ProbePayload>(data)
                            .map_err(|e| PointerError::MalformedMessage {
                                message: format!("invalid connection-test payload: {}", e),
                            })?
                            .ping
                    }
                    None => false,
                };
                Ok(IngressEvent::Probe { ping })
            }
            MessageType::ServerStatus => {
                let data = self.data.ok_or_else(|| PointerError::MalformedMessage {
                    message: "server-status without data".to_string(),
                })?;
                let status = serde_json::from_value(data).map_err(|e| {
                    PointerError::MalformedMessage {
                        message: format!("invalid server-status payload: {}", e),
                    }
                })?;
                Ok(IngressEvent::Status(status))
            }
        }
    }
}

/// Parse and validate a frame in one step
pub fn decode_frame(text: &str) -> Result<IngressEvent> {
    PointerMessage::parse(text)?.into_event()
}

pub(crate) fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
