//! Runtime configuration
//!
//! Resolved once at startup and handed to the components that need it.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PointerError, Result};
use crate::fs_utils::default_state_path;

/// Environment variable overriding the ingress port
pub const PORT_ENV_VAR: &str = "MCP_POINTER_PORT";

/// Environment variable overriding the shared state file location
pub const STATE_FILE_ENV_VAR: &str = "MCP_POINTER_STATE_FILE";

/// Default ingress port
pub const DEFAULT_PORT: u16 = 7007;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Follower retry interval
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Ingress listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressConfig {
    pub host: String,
    pub port: u16,
    /// Wait between bind attempts while another instance holds the port
    pub retry_interval: Duration,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl IngressConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the relay needs at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub ingress: IngressConfig,
    pub state_path: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ingress: IngressConfig::default(),
            state_path: default_state_path(),
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `MCP_POINTER_PORT` and `MCP_POINTER_STATE_FILE`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(PORT_ENV_VAR) {
            config.ingress.port = parse_port(&raw)?;
        }
        if let Some(path) = std::env::var_os(STATE_FILE_ENV_VAR).filter(|p| !p.is_empty()) {
            config.state_path = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Reject settings the listener cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.ingress.port == 0 {
            return Err(PointerError::Config {
                message: "ingress port must be between 1 and 65535".to_string(),
            });
        }
        if self.ingress.host.trim().is_empty() {
            return Err(PointerError::Config {
                message: "ingress host must not be empty".to_string(),
            });
        }
        if self.ingress.retry_interval.is_zero() {
            return Err(PointerError::Config {
                message: "retry interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a port number from its textual form
pub fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(PointerError::Config {
            message: format!("invalid port '{}' (expected 1-65535)", raw),
        }),
        Ok(port) => Ok(port),
    }
}
