//! Store configuration: where the API lives, whose todos to load, and how
//! long an error message stays visible.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/todos";
pub const DEFAULT_USER_ID: i64 = 50;
pub const DEFAULT_ERROR_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub user_id: i64,
    pub error_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Read `TODO_API_URL`, `TODO_USER_ID` and `TODO_ERROR_TIMEOUT_MS`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TODO_API_URL") {
            config.base_url = url;
        }
        if let Some(value) = lookup("TODO_USER_ID") {
            config.user_id = parse_var("TODO_USER_ID", value)?;
        }
        if let Some(value) = lookup("TODO_ERROR_TIMEOUT_MS") {
            let millis = parse_var("TODO_ERROR_TIMEOUT_MS", value)?;
            config.error_timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
