use std::env;
use std::time::Duration;

use serde::Deserialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::core::{AppError, Result};

const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Connections kept warm for the steady request load
    pub pool_size: u32,
    /// Hard ceiling; sweep runs and repayment bursts grow into this headroom
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Configuration("DATABASE_URL not set".to_string()))?,
            pool_size: env_u32("DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?,
            max_connections: env_u32("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        })
    }

    /// Build the MySQL pool
    ///
    /// Ledger and settlement transactions hold their row locks only briefly,
    /// so a short acquire timeout surfaces pool exhaustion as a fast failure
    /// rather than queueing requests behind it.
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        MySqlPoolOptions::new()
            .min_connections(self.pool_size)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(3600))
            .connect(&self.url)
            .await
            .map_err(AppError::Database)
    }
}

fn env_u32(key: &str, default: u32) -> Result<u32> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        Err(_) => Ok(default),
    }
}
