//! dbexport CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dbexport::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // DATABASE_URL usually lives in the application's .env
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr keeps stdout free for `dump --output -`)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse and execute CLI
    let cli = Cli::parse();
    cli.execute().await
}
