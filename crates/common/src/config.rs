//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Every knob has a default so
//! the app boots with an empty environment (the API key is supplied at
//! runtime through the credential store when absent here).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generation provider: "gemini" or "mock"
    pub genai_provider: String,

    /// Optional API key seeded into the credential store at startup
    pub gemini_api_key: Option<String>,

    /// Base URL for the Gemini REST surface
    pub gemini_base_url: String,

    /// Starting energy balance for a fresh session
    pub initial_energy: u32,

    /// Seconds between long-running operation polls
    pub poll_interval_secs: u64,

    /// Maximum polls before a video generation is abandoned as timed out
    pub poll_max_attempts: u32,

    /// Hours a finished work is retained before eviction
    pub retention_hours: u64,

    /// Seconds between expiry sweeps
    pub sweep_period_secs: u64,

    /// Runtime configuration
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            genai_provider: env::var("GENAI_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            initial_energy: parse_var("INITIAL_ENERGY", 10),
            poll_interval_secs: parse_var("POLL_INTERVAL_SECS", 10),
            poll_max_attempts: parse_var("POLL_MAX_ATTEMPTS", 90),
            retention_hours: parse_var("RETENTION_HOURS", 24),
            sweep_period_secs: parse_var("SWEEP_PERIOD_SECS", 60),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "relume=debug".to_string()),
        };

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours * 60 * 60)
    }

    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_period_secs)
    }
}

fn parse_var<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
