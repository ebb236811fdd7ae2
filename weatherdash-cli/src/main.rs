//! Binary crate for the `weatherdash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Terminal rendering and line input for the dashboard

use clap::Parser;

mod cli;
mod input;
mod terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the dashboard output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
