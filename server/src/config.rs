//! Startup configuration read from the environment.
//!
//! # Design
//! Values are parsed through an injectable lookup function so tests can feed
//! a fixed map instead of mutating the process environment. The resulting
//! `Config` is passed by value into app assembly; nothing here is global.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_DATABASE: &str = "todos.sqlite";
const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid listen address {value:?}: {reason}")]
    ListenAddress { value: String, reason: String },

    #[error("invalid APP_MODE {0:?}, expected \"debug\" or \"release\"")]
    Mode(String),
}

/// How verbose request logging is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppMode {
    Debug,
    #[default]
    Release,
}

impl AppMode {
    /// Filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            AppMode::Debug => "debug",
            AppMode::Release => "info",
        }
    }
}

impl FromStr for AppMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(AppMode::Debug),
            "release" => Ok(AppMode::Release),
            _ => Err(ConfigError::Mode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    File(PathBuf),
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_address: SocketAddr,
    pub database: Database,
    pub mode: AppMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup.
    ///
    /// `LISTEN_ADDRESS` wins over `PORT`; with neither set the server binds
    /// `127.0.0.1:3000`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup("LISTEN_ADDRESS").unwrap_or_else(|| {
            let port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
            format!("127.0.0.1:{port}")
        });
        let listen_address =
            address
                .parse::<SocketAddr>()
                .map_err(|err| ConfigError::ListenAddress {
                    value: address.clone(),
                    reason: err.to_string(),
                })?;

        let database = match lookup("DATABASE_URL").as_deref().map(str::trim) {
            Some(IN_MEMORY_DATABASE) => Database::InMemory,
            Some(path) if !path.is_empty() => Database::File(PathBuf::from(path)),
            _ => Database::File(PathBuf::from(DEFAULT_DATABASE)),
        };

        let mode = match lookup("APP_MODE") {
            Some(value) => value.parse()?,
            None => AppMode::default(),
        };

        Ok(Config {
            listen_address,
            database,
            mode,
        })
    }
}
