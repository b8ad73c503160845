//! Binary crate for the `weather` app.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Terminal prompts standing in for the app's dialogs
//! - The interactive page loop driving the core orchestrator

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the prompts; quiet unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
