//! Command implementations for the pagekit CLI

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use anyhow::{Context, Result};

/// Database URL from the flag or `DATABASE_URL` (clap reads both).
fn database_url(arg: Option<String>) -> Result<String> {
    arg.filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")
}
