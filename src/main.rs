//! mcp-pointer CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mcp_pointer::cli::{Cli, Commands};
use mcp_pointer::commands::{run_show_config, run_start};
use mcp_pointer::PointerError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli) {
        eprintln!("Error: {}", e);
        return e.exit_code();
    }

    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> mcp_pointer::Result<String> {
    match &cli.command {
        Some(Commands::Start(args)) => run_start(Some(args)),
        Some(Commands::ShowConfig) => run_show_config(),
        None => run_start(None),
    }
}

/// Logs go to stderr: stdout carries MCP JSON-RPC
fn init_tracing(cli: &Cli) -> mcp_pointer::Result<()> {
    let filter = if cli.silent {
        EnvFilter::new("off")
    } else {
        let directive = format!("mcp_pointer={}", cli.log_level.as_str());
        EnvFilter::from_default_env()
            .add_directive(directive.parse().map_err(|e| PointerError::Config {
                message: format!("Invalid log directive '{}': {}", directive, e),
            })?)
            .add_directive("rmcp=warn".parse().map_err(|e| PointerError::Config {
                message: format!("Invalid log directive 'rmcp=warn': {}", e),
            })?)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    Ok(())
}
