use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
/// Only `API_BASE_URL` changes how the service talks to the backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: normalize_base_url(
                &std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Strips trailing slashes so endpoint paths can be appended verbatim.
/// Blank values fall back to the loopback default.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
