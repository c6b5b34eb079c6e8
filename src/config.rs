use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub card_api_url: String,
    pub card_api_delay_ms: u64,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            card_api_url: env::var("CARD_API_URL")
                .unwrap_or_else(|_| "https://api.scryfall.com".to_string()),
            card_api_delay_ms: env::var("CARD_API_DELAY_MS")
                .unwrap_or_else(|_| "150".to_string())
                .parse()?,
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "72".to_string())
                .parse()?,
        })
    }
}
