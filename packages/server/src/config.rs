use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    /// Where chunk directories and assembled captures live.
    pub upload_dir: PathBuf,
    /// Idle time before an upload session and its files are evicted.
    pub session_ttl_secs: u64,
    /// Deadline for one classifier round trip.
    pub classifier_timeout_secs: u64,
    /// Model used when the caller does not name one.
    pub default_model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./temp_uploads".to_string())
                .into(),
            session_ttl_secs: env::var("UPLOAD_SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("UPLOAD_SESSION_TTL_SECS must be a valid number")?,
            classifier_timeout_secs: env::var("CLASSIFIER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("CLASSIFIER_TIMEOUT_SECS must be a valid number")?,
            default_model: env::var("DEFAULT_MODEL")
                .unwrap_or_else(|_| "o3-mini-2025-01-31".to_string()),
        })
    }
}
