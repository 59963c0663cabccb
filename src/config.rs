// src/config.rs
use std::env;

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is honored via dotenvy before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub use_translation: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "awaken.db".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            use_translation: env::var("USE_TRANSLATION").map(|v| v == "1").unwrap_or(false),
        }
    }
}
