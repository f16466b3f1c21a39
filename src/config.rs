use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::service::pipeline::FetchOptions;

pub const DEFAULT_WATCHLIST_PATH: &str = "data/watchlist.json";
pub const DEFAULT_OUTPUT_PATH: &str = "data/earnings.json";
pub const DEFAULT_INTER_REQUEST_DELAY_MS: u64 = 350;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be one of 1/0, true/false, yes/no, on/off, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct EarningsConfig {
    pub watchlist_path: PathBuf,
    pub output_path: PathBuf,
    pub proxy: Option<String>,
    pub fetch: FetchOptions,
}

impl Default for EarningsConfig {
    fn default() -> Self {
        Self {
            watchlist_path: PathBuf::from(DEFAULT_WATCHLIST_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            proxy: None,
            fetch: FetchOptions::default(),
        }
    }
}

impl EarningsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = read("WATCHLIST_PATH") {
            config.watchlist_path = PathBuf::from(path);
        }
        if let Some(path) = read("EARNINGS_OUT_PATH") {
            config.output_path = PathBuf::from(path);
        }
        config.proxy = read("YAHOO_PROXY");

        if let Some(raw) = read("FILTER_STALE_DATES") {
            config.fetch.filter_stale_dates = parse_flag("FILTER_STALE_DATES", &raw)?;
        }
        if let Some(raw) = read("SHARED_SESSION") {
            config.fetch.shared_session = parse_flag("SHARED_SESSION", &raw)?;
        }
        if let Some(raw) = read("INTER_REQUEST_DELAY_MS") {
            let ms = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "INTER_REQUEST_DELAY_MS",
                    value: raw.clone(),
                })?;
            config.fetch.inter_request_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: raw.to_string(),
        }),
    }
}
