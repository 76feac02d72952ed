//! Show the manual MCP configuration for AI tools
//!
//! Only prints; it never edits another tool's configuration files.

use serde_json::json;

use crate::config::{RelayConfig, PORT_ENV_VAR};
use crate::error::{PointerError, Result};

/// Server name used in the `mcpServers` map
pub const MCP_SERVER_NAME: &str = "pointer";

/// Render the configuration snippet for the given port
pub fn config_snippet(port: u16) -> Result<String> {
    let config = json!({
        "mcpServers": {
            MCP_SERVER_NAME: {
                "command": "mcp-pointer",
                "args": ["start"],
                "env": { PORT_ENV_VAR: port.to_string() }
            }
        }
    });

    serde_json::to_string_pretty(&config).map_err(|e| PointerError::Config {
        message: format!("Failed to render configuration: {}", e),
    })
}

/// Run the show-config command
pub fn run_show_config() -> Result<String> {
    let config = RelayConfig::from_env()?;
    let snippet = config_snippet(config.ingress.port)?;
    Ok(format!(
        "Add this to your AI tool's MCP settings:\n{}\n",
        snippet
    ))
}
