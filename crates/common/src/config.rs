//! Application configuration

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Expired-challenge sweep interval in minutes (0 = disabled)
    pub sweep_interval_minutes: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fluenta.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            sweep_interval_minutes: env::var("SWEEP_INTERVAL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(60),
        }
    }
}
