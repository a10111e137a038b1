//! Application configuration loaded from environment variables.

use crate::errors::{IndexerError, Result};

/// Admission/projection topic this deployment tracks.
pub const DEFAULT_TOPIC: &str = "tm_bounty";

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Topic identifier scoping admission and lifecycle events
    pub topic: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./bounties.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| IndexerError::Config("Invalid API_PORT".to_string()))?,
            topic: env_var("TOPIC").unwrap_or_else(|_| DEFAULT_TOPIC.to_string()),
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| IndexerError::Config(format!("Missing env var: {key}")))
}
