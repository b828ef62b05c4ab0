mod cli;
mod engine;
mod error;
mod geocode;
mod model;
mod render;
mod sectionize;
mod storage;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr and are off unless RUST_LOG says otherwise;
    // user-facing output is handled by the CLI layer.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    cli::run(args).await
}
