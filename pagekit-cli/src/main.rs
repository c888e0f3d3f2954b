//! pagekit CLI - page-builder backend server
//!
//! - `serve`: run the HTTP API (migrates first unless `--no-migrate`)
//! - `migrate`: create or update the database schema

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::{migrate::MigrateArgs, serve::ServeArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pagekit",
    author,
    version,
    about = "Page-builder backend: stores, pages and ordered widgets over HTTP"
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create or update the database schema
    Migrate(MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _telemetry = tracing_setup::init(TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
    }
}
