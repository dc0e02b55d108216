use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub sweeper: SweeperConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Overdue sweeper schedule
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// Hours between overdue sweeps (defaults to once per day)
    pub interval_hours: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            sweeper: SweeperConfig {
                interval_hours: env::var("OVERDUE_SWEEP_INTERVAL_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration(
                            "Invalid OVERDUE_SWEEP_INTERVAL_HOURS".to_string(),
                        )
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sweeper.interval_hours == 0 {
            return Err(AppError::Configuration(
                "Sweep interval must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections < self.database.pool_size {
            return Err(AppError::Configuration(
                "DATABASE_MAX_CONNECTIONS must be >= DATABASE_POOL_SIZE".to_string(),
            ));
        }

        Ok(())
    }
}
