use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "cobranza360.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log filter used when `RUST_LOG` is unset; batch runs outside development stay quiet.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "info",
            Self::Test | Self::Production => "warn",
        }
    }
}

/// Resolved configuration, passed explicitly into the pipeline entry points.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub store: StoreConfig,
}

/// Connection descriptor for the debtor store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub create_if_missing: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
        }
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.create_if_missing {
            "read-write, create"
        } else {
            "read-write"
        };
        write!(f, "{} ({mode})", self.path.display())
    }
}

impl AppConfig {
    /// Load `.env` (if present) and resolve settings from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = AppEnvironment::parse(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let path = env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        if path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        let create_if_missing = match env::var("DB_CREATE") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidFlag {
                key: "DB_CREATE",
                value: raw,
            })?,
            Err(_) => false,
        };

        Ok(Self {
            environment,
            store: StoreConfig {
                path: PathBuf::from(path),
                create_if_missing,
            },
        })
    }

    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = path.into();
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DB_PATH must not be empty")]
    EmptyDatabasePath,
    #[error("{key} must be a boolean, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}
