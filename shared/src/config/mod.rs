//! Configuration module
//!
//! - `auth` - Session token lifetimes, email token lifetime and key custody
//! - `environment` - Environment detection and logging configuration
//!
//! Values are parsed here once and handed to the core as typed structs; the
//! core never reads environment variables itself.

pub mod auth;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use auth::{
    AuthConfig, EmailTokenConfig, KeyStoreBackend, KeyStoreConfig, SessionTokenConfig,
    MAX_EMAIL_TOKEN_LIFE_HOURS, MAX_TOKEN_LIFE_MINUTES,
};
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Credential configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment, reading the matching `.env` file first
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        if dotenvy::from_filename(environment.env_file()).is_err() {
            dotenvy::dotenv().ok();
        }

        Self {
            environment,
            auth: AuthConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

/// Read a string variable, logging when the default is used
pub(crate) fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(key, default, "Variable not set, using default value");
            default.to_string()
        }
    }
}

/// Read and parse a variable, falling back to the default on absence or parse failure
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read a lifetime, falling back to the default unless it lies in `1..=max`
pub(crate) fn parse_lifetime_env_or(key: &str, default: i64, max: i64) -> i64 {
    let value = parse_env_or(key, default);
    if (1..=max).contains(&value) {
        value
    } else {
        tracing::warn!(key, value, default, max, "Lifetime out of range, using default");
        default
    }
}
