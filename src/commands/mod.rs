//! Command modules for the mcp-pointer CLI
//!
//! - `start` - Run the relay: ingress socket (best effort) + MCP server on stdio
//! - `show_config` - Print the MCP client configuration snippet
//!
//! Handlers return the text to print on stdout, like the rest of the CLI.

pub mod show_config;
pub mod start;

pub use show_config::run_show_config;
pub use start::{run_relay, run_start};
