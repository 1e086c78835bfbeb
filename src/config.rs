//! Configuration management

use anyhow::{self, Context, Result};

use crate::services::planner::PlannerSettings;
use crate::services::proximity::DEFAULT_NEARBY_LIMIT;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// Result count for nearby lookups that do not pass a limit
    pub nearby_default_limit: usize,

    /// Upper bound accepted for nearby lookups
    pub nearby_max_limit: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 10)?;
        let nearby_default_limit = parse_var("NEARBY_DEFAULT_LIMIT", DEFAULT_NEARBY_LIMIT)?;
        let nearby_max_limit = parse_var("NEARBY_MAX_LIMIT", 50)?;

        if nearby_default_limit == 0 || nearby_max_limit == 0 {
            anyhow::bail!("NEARBY_DEFAULT_LIMIT and NEARBY_MAX_LIMIT must be at least 1");
        }
        if nearby_default_limit > nearby_max_limit {
            anyhow::bail!(
                "NEARBY_DEFAULT_LIMIT ({}) must not exceed NEARBY_MAX_LIMIT ({})",
                nearby_default_limit,
                nearby_max_limit
            );
        }

        Ok(Self {
            nats_url,
            database_url,
            database_max_connections,
            nearby_default_limit,
            nearby_max_limit,
        })
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            nearby_default_limit: self.nearby_default_limit,
            nearby_max_limit: self.nearby_max_limit,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer (got {:?})", name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_unset() {
        std::env::remove_var("POOLROUTE_TEST_UNSET");
        assert_eq!(parse_var("POOLROUTE_TEST_UNSET", 7usize).unwrap(), 7);
    }

    #[test]
    fn test_parse_var_reads_value() {
        std::env::set_var("POOLROUTE_TEST_LIMIT", " 12 ");
        assert_eq!(parse_var("POOLROUTE_TEST_LIMIT", 5usize).unwrap(), 12);
        std::env::remove_var("POOLROUTE_TEST_LIMIT");
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("POOLROUTE_TEST_BAD", "many");
        let err = parse_var("POOLROUTE_TEST_BAD", 5usize).unwrap_err();
        assert!(err.to_string().contains("POOLROUTE_TEST_BAD"));
        std::env::remove_var("POOLROUTE_TEST_BAD");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_defaults() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::remove_var("NATS_URL");
        std::env::remove_var("NEARBY_DEFAULT_LIMIT");
        std::env::remove_var("NEARBY_MAX_LIMIT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.nearby_default_limit, 5);
        assert_eq!(config.nearby_max_limit, 50);
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_default_above_max() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("NEARBY_DEFAULT_LIMIT", "20");
        std::env::set_var("NEARBY_MAX_LIMIT", "10");

        assert!(Config::from_env().is_err());

        std::env::remove_var("NEARBY_DEFAULT_LIMIT");
        std::env::remove_var("NEARBY_MAX_LIMIT");
    }
}
