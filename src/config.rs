//! Runtime configuration
//!
//! Read from the environment (after `dotenvy` has loaded `.env`):
//!
//! | key                  | default                              |
//! |----------------------|--------------------------------------|
//! | `DATABASE_URL`       | `sqlite://./household_budget.db`     |
//! | `BACKEND`            | `local` (`local` or `remote`)        |
//! | `API_BASE_URL`       | `http://127.0.0.1:3000`              |
//! | `BIND_ADDR`          | `127.0.0.1:3000`                     |
//! | `SPLIT_LIMIT_POLICY` | `ignore` (`ignore` or `reject`)      |
//! | `RUST_LOG`           | `info`                               |
//! | `LOG_FILE`           | `household_budget.log` (TUI only)    |

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::split::LimitPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Remote,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("local") {
            Ok(Backend::Local)
        } else if s.eq_ignore_ascii_case("remote") {
            Ok(Backend::Remote)
        } else {
            Err(format!("unknown backend '{s}' (expected local|remote)"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub backend: Backend,
    pub api_base_url: String,
    pub bind_addr: SocketAddr,
    pub limit_policy: LimitPolicy,
    pub log_filter: String,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./household_budget.db".to_string(),
            backend: Backend::Local,
            api_base_url: "http://127.0.0.1:3000".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            limit_policy: LimitPolicy::Ignore,
            log_filter: "info".to_string(),
            log_file: "household_budget.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(v) = lookup("DATABASE_URL") {
            config.database_url = v;
        }
        if let Some(v) = lookup("BACKEND") {
            config.backend = parse("BACKEND", &v)?;
        }
        if let Some(v) = lookup("API_BASE_URL") {
            config.api_base_url = v;
        }
        if let Some(v) = lookup("BIND_ADDR") {
            config.bind_addr = parse("BIND_ADDR", &v)?;
        }
        if let Some(v) = lookup("SPLIT_LIMIT_POLICY") {
            config.limit_policy = parse("SPLIT_LIMIT_POLICY", &v)?;
        }
        if let Some(v) = lookup("RUST_LOG") {
            config.log_filter = v;
        }
        if let Some(v) = lookup("LOG_FILE") {
            config.log_file = v;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
