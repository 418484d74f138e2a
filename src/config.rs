use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Built single-page app; when unset only the API is served.
    pub static_dir: Option<PathBuf>,
    pub admin_username: String,
    /// Admin seeding is skipped when no password is configured.
    pub admin_password: Option<String>,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(AppConfig {
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            admin_username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: get("ADMIN_PASSWORD"),
            session_ttl_hours: parse_or(get("SESSION_TTL_HOURS"), "SESSION_TTL_HOURS", 24)?,
            bcrypt_cost: parse_or(get("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
