use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragmill::cli::{self, Args};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    cli::run(args).await
}
