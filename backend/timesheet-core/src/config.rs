// src/config.rs
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

use crate::timesheet_client::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};

pub const ENV_PREFIX: &str = "TIMESHEET_";
pub const DEFAULT_SESSION_FILE: &str = "timesheet_session.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TIMESHEET_* environment configuration")]
    Env(#[from] envy::Error),
    #[error("TIMESHEET_REQUEST_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,
}

/// Runtime settings, read from `TIMESHEET_*` variables (an optional `.env` file is loaded first).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
