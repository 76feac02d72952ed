//! Error types and exit codes for mcp-pointer

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for mcp-pointer operations
#[derive(Error, Debug)]
pub enum PointerError {
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to bind ingress socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist selection to {}: {source}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pointer message: {message}")]
    MalformedMessage { message: String },

    #[error("Query service error: {message}")]
    QueryService { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PointerError {
    /// Convert error to the process exit code:
    /// - 0: Success
    /// - 1: IO error / state write failure
    /// - 2: Invalid configuration
    /// - 3: Ingress bind failure (anything but port contention)
    /// - 4: Query service could not start or failed
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config { .. } => ExitCode::from(2),
            Self::Bind { .. } => ExitCode::from(3),
            Self::QueryService { .. } => ExitCode::from(4),
            Self::StateWrite { .. } | Self::MalformedMessage { .. } | Self::Io(_) => {
                ExitCode::from(1)
            }
        }
    }
}

/// Result type alias for mcp-pointer operations
pub type Result<T> = std::result::Result<T, PointerError>;
