//! Binary crate for the `pinpoint` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Rendering the current selection as text

use clap::Parser;
use pinpoint_core::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod explore;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config = Config::load()?;
    init_tracing(&config);

    cmd.run(config).await
}

/// Logs go to stderr so rendered views on stdout stay clean.
fn init_tracing(config: &Config) {
    let default_filter = config.log_filter.as_deref().unwrap_or("warn");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
