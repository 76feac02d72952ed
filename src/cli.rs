//! CLI argument definitions using clap

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    IngressConfig, RelayConfig, DEFAULT_HOST, DEFAULT_PORT, PORT_ENV_VAR, STATE_FILE_ENV_VAR,
};
use crate::fs_utils::default_state_path;

/// Let your AI assistant see the DOM element you point at in the browser
#[derive(Parser, Debug)]
#[command(name = "mcp-pointer")]
#[command(about = "MCP Pointer relay: browser extension -> MCP tools")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `start`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level
    #[arg(short, long, default_value = "info", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Disable all logging
    #[arg(short, long, global = true)]
    pub silent: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start pointing at elements (run the relay and MCP server on stdio)
    Start(StartArgs),

    /// Show the MCP configuration snippet for AI tools
    ShowConfig,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// WebSocket port the browser extension connects to
    #[arg(short, long, env = PORT_ENV_VAR, default_value_t = DEFAULT_PORT,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Interface to bind the WebSocket server on
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Shared state file (must be the same for every instance on this machine)
    #[arg(long, env = STATE_FILE_ENV_VAR, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Milliseconds between bind attempts while another instance holds the port
    #[arg(long, default_value_t = 5000, hide = true)]
    pub retry_interval_ms: u64,
}

impl StartArgs {
    pub fn to_config(&self) -> RelayConfig {
        RelayConfig {
            ingress: IngressConfig {
                host: self.host.clone(),
                port: self.port,
                retry_interval: Duration::from_millis(self.retry_interval_ms),
            },
            state_path: self.state_file.clone().unwrap_or_else(default_state_path),
        }
    }
}
