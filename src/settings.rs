//! Process settings from environment variables (`.env` is loaded by the binary).

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cmdb";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("{var}: cannot parse '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding the entity tables. Must be a plain identifier.
    pub schema: String,
    pub max_connections: u32,
    /// Deadline per store call; None when `CMDB_QUERY_TIMEOUT_MS=0`.
    pub query_timeout: Option<Duration>,
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema: DEFAULT_SCHEMA.into(),
            max_connections: 5,
            query_timeout: Some(Duration::from_millis(5000)),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let d = Settings::default();
        let timeout_ms: u64 = parse(&lookup, "CMDB_QUERY_TIMEOUT_MS", 5000)?;
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(d.database_url),
            schema: lookup("CMDB_SCHEMA").unwrap_or(d.schema),
            max_connections: parse(&lookup, "CMDB_MAX_CONNECTIONS", d.max_connections)?,
            query_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            bind_addr: lookup("CMDB_BIND_ADDR").unwrap_or(d.bind_addr),
            max_body_bytes: parse(&lookup, "CMDB_MAX_BODY_BYTES", d.max_body_bytes)?,
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, SettingsError> {
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}
