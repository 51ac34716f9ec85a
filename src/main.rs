//! Console entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shopadmin_lib::console::{output, Cli};

#[tokio::main]
async fn main() {
    // Environment overrides may live in a local .env during development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
