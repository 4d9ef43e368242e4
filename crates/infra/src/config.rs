//! Store configuration loaded from the process environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATABASE_URL` | unset | Postgres connection string; unset selects the in-memory store |
//! | `TIMBERYARD_STORAGE_TIMEOUT_MS` | `5000` | upper bound on every storage call |
//! | `TIMBERYARD_DB_MAX_CONNECTIONS` | `10` | Postgres pool size |

use std::time::Duration;

use thiserror::Error;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const STORAGE_TIMEOUT_MS: &str = "TIMBERYARD_STORAGE_TIMEOUT_MS";
pub const DB_MAX_CONNECTIONS: &str = "TIMBERYARD_DB_MAX_CONNECTIONS";

const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub storage_timeout: Duration,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a
    /// map in tests). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get(DATABASE_URL);

        let storage_timeout = match get(STORAGE_TIMEOUT_MS) {
            Some(raw) => Duration::from_millis(parse_positive::<u64>(STORAGE_TIMEOUT_MS, &raw)?),
            None => DEFAULT_STORAGE_TIMEOUT,
        };

        let max_connections = match get(DB_MAX_CONNECTIONS) {
            Some(raw) => parse_positive::<u32>(DB_MAX_CONNECTIONS, &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            storage_timeout,
            max_connections,
        })
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };
    let value: T = raw.trim().parse().map_err(|e: T::Err| invalid(e.to_string()))?;
    if value <= T::default() {
        return Err(invalid("must be greater than 0".to_string()));
    }
    Ok(value)
}
