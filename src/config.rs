use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub subscriptions: SubscriptionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::ConfigError(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Knobs for the subscription domain rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    /// Reject an `end_date` whose month precedes the `start_date` month.
    #[serde(default = "default_true")]
    pub enforce_date_order: bool,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            enforce_date_order: true,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_retries() -> u32 {
    10
}

fn default_retry_delay_secs() -> u64 {
    3
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("invalid config file: {e}")))
    }

    fn from_env_defaults() -> AppResult<Self> {
        let backend = match get_env("DB_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageBackend::default(),
        };

        // postgres needs a URL when there is no config file to take it from
        let url = match (backend, get_env("DATABASE_URL")) {
            (_, Some(url)) => url,
            (StorageBackend::Memory, None) => String::new(),
            (StorageBackend::Postgres, None) => {
                return Err(AppError::ConfigError(
                    "DATABASE_URL is not set and no config.toml was found".to_string(),
                ));
            }
        };

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                backend,
                url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", default_max_connections()),
                connect_retries: get_env_parse("DB_CONNECT_RETRIES", default_connect_retries()),
                retry_delay_secs: get_env_parse("DB_RETRY_DELAY_SECS", default_retry_delay_secs()),
                connect_timeout_secs: default_connect_timeout_secs(),
            },
            logging: LoggingConfig {
                level: get_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            subscriptions: SubscriptionSettings {
                enforce_date_order: get_env_parse("SUBSCRIPTIONS_ENFORCE_DATE_ORDER", true),
            },
        })
    }

    fn apply_env_overrides(&mut self) -> AppResult<()> {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DB_BACKEND") {
            self.override_backend(&v)?;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("DB_CONNECT_RETRIES")
            && let Ok(n) = v.parse()
        {
            self.database.connect_retries = n;
        }
        if let Ok(v) = env::var("DB_RETRY_DELAY_SECS")
            && let Ok(n) = v.parse()
        {
            self.database.retry_delay_secs = n;
        }
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = env::var("SUBSCRIPTIONS_ENFORCE_DATE_ORDER")
            && let Ok(b) = v.parse()
        {
            self.subscriptions.enforce_date_order = b;
        }
        Ok(())
    }

    /// An unknown backend name is an error whether or not a file was loaded.
    fn override_backend(&mut self, value: &str) -> AppResult<()> {
        self.database.backend = value.parse()?;
        Ok(())
    }

    fn validate(&self) -> AppResult<()> {
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::ConfigError(
                "database.url is required for the postgres backend".to_string(),
            ));
        }
        if self.database.connect_retries == 0 {
            return Err(AppError::ConfigError(
                "database.connect_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
