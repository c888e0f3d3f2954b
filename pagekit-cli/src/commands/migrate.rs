//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use pagekit_server::db::{create_pool, migrations, PoolConfig};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Create or update the stores/pages/widgets schema.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = super::database_url(args.database_url)?;

    let pool = create_pool(&database_url, &PoolConfig::from_env())
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool).await.context("Migration failed")?;
    pool.close().await;

    Ok(())
}
