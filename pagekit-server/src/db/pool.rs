//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and idle lifetime.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

/// Default idle lifetime before a pooled connection is closed.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Pool sizing and connection lifetimes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request may wait for a free connection
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_lifetime: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl PoolConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// - `PAGEKIT_DB_MAX_CONNECTIONS`
    /// - `PAGEKIT_DB_MIN_CONNECTIONS`
    /// - `PAGEKIT_DB_IDLE_TIMEOUT_SECS`
    /// - `PAGEKIT_DB_MAX_LIFETIME_SECS` (`0` disables)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            max_connections: parse("PAGEKIT_DB_MAX_CONNECTIONS")
                .map(|v| v.clamp(1, u32::MAX as u64) as u32)
                .unwrap_or(defaults.max_connections),
            min_connections: parse("PAGEKIT_DB_MIN_CONNECTIONS")
                .map(|v| v.min(u32::MAX as u64) as u32)
                .unwrap_or(defaults.min_connections),
            acquire_timeout: defaults.acquire_timeout,
            idle_timeout: parse("PAGEKIT_DB_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            max_lifetime: match parse("PAGEKIT_DB_MAX_LIFETIME_SECS") {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.max_lifetime,
            },
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .max_lifetime(self.max_lifetime)
    }
}

/// Create a PostgreSQL connection pool.
///
/// Establishes one connection up front so a bad URL or unreachable server
/// fails at startup rather than on the first request.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/pagekit", &PoolConfig::default()).await?;
/// ```
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect(database_url).await
}

/// Create a pool that connects on first use.
pub fn create_lazy_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    config.options().connect_lazy(database_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("PAGEKIT_DB_MAX_CONNECTIONS", "10"),
            ("PAGEKIT_DB_IDLE_TIMEOUT_SECS", "30"),
            ("PAGEKIT_DB_MAX_LIFETIME_SECS", "0"),
        ]
        .into_iter()
        .collect();

        let config = PoolConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 0);
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.max_lifetime, None);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = PoolConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn max_connections_never_zero() {
        let config = PoolConfig::from_lookup(|k| {
            (k == "PAGEKIT_DB_MAX_CONNECTIONS").then(|| "0".to_string())
        });
        assert_eq!(config.max_connections, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url, &PoolConfig::default())
            .await
            .expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }
}
