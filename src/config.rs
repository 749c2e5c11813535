use std::env;

use crate::constants::{DEFAULT_CHARACTER_SLOTS, DEFAULT_SEED_ACCOUNT};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    /// Name of the account seeded at startup (owner of all characters)
    pub seed_account: String,
    /// Character slots granted to the seed account on first creation
    pub character_slots: u32,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/roster.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let seed_account =
            env::var("SEED_ACCOUNT").unwrap_or_else(|_| DEFAULT_SEED_ACCOUNT.to_string());

        let character_slots = env::var("CHARACTER_SLOTS")
            .unwrap_or_else(|_| DEFAULT_CHARACTER_SLOTS.to_string())
            .parse()
            .map_err(|_| "Invalid CHARACTER_SLOTS")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            seed_account,
            character_slots,
            environment,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
