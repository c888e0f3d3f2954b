//! HTTP server command

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use pagekit_server::db::{create_pool, migrations, PoolConfig};
use pagekit_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "PAGEKIT_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Allowed CORS origins, comma separated (default: localhost)
    #[arg(long, env = "PAGEKIT_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = pagekit_server::decode::DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Storage deadline per request, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub request_timeout_ms: u64,

    /// Skip running migrations before serving
    #[arg(long)]
    pub no_migrate: bool,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            cors_origins: self
                .cors_origins
                .iter()
                .map(|o| o.trim().to_owned())
                .filter(|o| !o.is_empty())
                .collect(),
            body_limit: self.body_limit,
            request_timeout: Duration::from_millis(self.request_timeout_ms.max(1)),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();
    let database_url = super::database_url(args.database_url)?;

    tracing::info!("Starting pagekit server on {}", config.bind_addr);

    let pool_config = PoolConfig::from_env();
    tracing::debug!(?pool_config, "pool config loaded");

    let pool = create_pool(&database_url, &pool_config)
        .await
        .context("Failed to create database pool")?;

    if !args.no_migrate {
        migrations::run(&pool).await.context("Migration failed")?;
    }

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ServeArgs,
    }

    #[test]
    fn flags_build_server_config() {
        let harness = Harness::parse_from([
            "pagekit",
            "--bind",
            "0.0.0.0:8080",
            "--cors-origins",
            "https://shop.example, https://admin.example",
            "--request-timeout-ms",
            "1500",
        ]);
        let config = harness.args.server_config();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.cors_origins,
            vec!["https://shop.example", "https://admin.example"]
        );
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.body_limit, 1_048_576);
    }
}
