//! Token lifetime and key custody configuration

use serde::{Deserialize, Serialize};

use super::{env_or, parse_env_or, parse_lifetime_env_or};

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_LIFE_MINUTES: i64 = 10080;

/// Default access token lifetime
pub const DEFAULT_ACCESS_TOKEN_LIFE_MINUTES: i64 = 15;

/// Default email verification token lifetime
pub const DEFAULT_EMAIL_TOKEN_LIFE_HOURS: i64 = 12;

/// Longest accepted session token lifetime (one year)
pub const MAX_TOKEN_LIFE_MINUTES: i64 = 60 * 24 * 365;

/// Longest accepted email verification token lifetime (30 days)
pub const MAX_EMAIL_TOKEN_LIFE_HOURS: i64 = 24 * 30;

/// Session token (JWT) configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionTokenConfig {
    /// Refresh token lifetime in minutes
    pub refresh_token_life_minutes: i64,

    /// Access token lifetime in minutes
    pub access_token_life_minutes: i64,
}

impl Default for SessionTokenConfig {
    fn default() -> Self {
        Self {
            refresh_token_life_minutes: DEFAULT_REFRESH_TOKEN_LIFE_MINUTES,
            access_token_life_minutes: DEFAULT_ACCESS_TOKEN_LIFE_MINUTES,
        }
    }
}

impl SessionTokenConfig {
    /// Load lifetimes from `REFRESH_TOKEN_LIFE_MINUTES` and `ACCESS_TOKEN_LIFE_MINUTES`
    ///
    /// Values outside `1..=MAX_TOKEN_LIFE_MINUTES` fall back to the default.
    pub fn from_env() -> Self {
        Self {
            refresh_token_life_minutes: parse_lifetime_env_or(
                "REFRESH_TOKEN_LIFE_MINUTES",
                DEFAULT_REFRESH_TOKEN_LIFE_MINUTES,
                MAX_TOKEN_LIFE_MINUTES,
            ),
            access_token_life_minutes: parse_lifetime_env_or(
                "ACCESS_TOKEN_LIFE_MINUTES",
                DEFAULT_ACCESS_TOKEN_LIFE_MINUTES,
                MAX_TOKEN_LIFE_MINUTES,
            ),
        }
    }

    /// Set refresh token lifetime in minutes
    pub fn with_refresh_life_minutes(mut self, minutes: i64) -> Self {
        self.refresh_token_life_minutes = minutes;
        self
    }

    /// Set access token lifetime in minutes
    pub fn with_access_life_minutes(mut self, minutes: i64) -> Self {
        self.access_token_life_minutes = minutes;
        self
    }
}

/// Email verification token configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailTokenConfig {
    /// Token lifetime in hours
    pub token_life_hours: i64,
}

impl Default for EmailTokenConfig {
    fn default() -> Self {
        Self {
            token_life_hours: DEFAULT_EMAIL_TOKEN_LIFE_HOURS,
        }
    }
}

impl EmailTokenConfig {
    /// Load lifetime from `EMAIL_TOKEN_LIFE_HOURS`
    pub fn from_env() -> Self {
        Self {
            token_life_hours: parse_lifetime_env_or(
                "EMAIL_TOKEN_LIFE_HOURS",
                DEFAULT_EMAIL_TOKEN_LIFE_HOURS,
                MAX_EMAIL_TOKEN_LIFE_HOURS,
            ),
        }
    }
}

/// Where the session signing key pair lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStoreBackend {
    /// Generated per process, never persisted
    Memory,
    /// AWS S3 bucket shared by all replicas
    S3,
    /// Local directory (single host deployments)
    File,
}

impl Default for KeyStoreBackend {
    fn default() -> Self {
        KeyStoreBackend::Memory
    }
}

impl std::fmt::Display for KeyStoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyStoreBackend::Memory => write!(f, "memory"),
            KeyStoreBackend::S3 => write!(f, "s3"),
            KeyStoreBackend::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for KeyStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(KeyStoreBackend::Memory),
            "s3" | "aws-s3" => Ok(KeyStoreBackend::S3),
            "file" | "fs" => Ok(KeyStoreBackend::File),
            _ => Err(format!("Invalid key store backend: {}", s)),
        }
    }
}

/// Key store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyStoreConfig {
    /// Active backend
    #[serde(default)]
    pub backend: KeyStoreBackend,

    /// Object path of the PEM encoded private signing key
    pub signing_key_path: String,

    /// Object path of the PEM encoded public verification key
    pub verification_key_path: String,

    /// S3 bucket name (s3 backend)
    #[serde(default)]
    pub bucket: Option<String>,

    /// S3 region (s3 backend)
    #[serde(default)]
    pub region: Option<String>,

    /// Root directory (file backend)
    #[serde(default)]
    pub directory: Option<String>,

    /// Upper bound for a single store round trip in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            backend: KeyStoreBackend::default(),
            signing_key_path: String::from("jwt/signing_key.pem"),
            verification_key_path: String::from("jwt/verification_key.pem"),
            bucket: None,
            region: None,
            directory: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl KeyStoreConfig {
    /// Load key store settings from the environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let backend = std::env::var("KEY_STORE_BACKEND")
            .ok()
            .and_then(|value| match value.parse() {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!(error = %e, "Falling back to default key store backend");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            backend,
            signing_key_path: env_or("JWT_SIGNING_KEY_PATH", &defaults.signing_key_path),
            verification_key_path: env_or(
                "JWT_VERIFICATION_KEY_PATH",
                &defaults.verification_key_path,
            ),
            bucket: std::env::var("KEY_STORE_BUCKET").ok(),
            region: std::env::var("KEY_STORE_REGION")
                .or_else(|_| std::env::var("AWS_REGION"))
                .ok(),
            directory: std::env::var("KEY_STORE_DIR").ok(),
            timeout_secs: parse_env_or("KEY_STORE_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }

    /// Store round trip bound as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Complete credential configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Session token lifetimes
    #[serde(default)]
    pub session: SessionTokenConfig,

    /// Email verification token settings
    #[serde(default)]
    pub email: EmailTokenConfig,

    /// Signing key custody
    #[serde(default)]
    pub key_store: KeyStoreConfig,
}

impl AuthConfig {
    /// Load every credential setting from the environment
    pub fn from_env() -> Self {
        Self {
            session: SessionTokenConfig::from_env(),
            email: EmailTokenConfig::from_env(),
            key_store: KeyStoreConfig::from_env(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let config = SessionTokenConfig::default();
        assert_eq!(config.refresh_token_life_minutes, 10080);
        assert_eq!(config.access_token_life_minutes, 15);
    }

    #[test]
    fn test_session_from_env() {
        temp_env::with_vars(
            [
                ("REFRESH_TOKEN_LIFE_MINUTES", Some("60")),
                ("ACCESS_TOKEN_LIFE_MINUTES", Some("not-a-number")),
            ],
            || {
                let config = SessionTokenConfig::from_env();
                assert_eq!(config.refresh_token_life_minutes, 60);
                // Unparseable values fall back to the default
                assert_eq!(config.access_token_life_minutes, 15);
            },
        );
    }

    #[test]
    fn test_out_of_range_lifetimes_fall_back() {
        temp_env::with_vars(
            [
                ("REFRESH_TOKEN_LIFE_MINUTES", Some("1000000000000000")),
                ("ACCESS_TOKEN_LIFE_MINUTES", Some("-5")),
                ("EMAIL_TOKEN_LIFE_HOURS", Some("0")),
            ],
            || {
                let session = SessionTokenConfig::from_env();
                assert_eq!(session.refresh_token_life_minutes, DEFAULT_REFRESH_TOKEN_LIFE_MINUTES);
                assert_eq!(session.access_token_life_minutes, DEFAULT_ACCESS_TOKEN_LIFE_MINUTES);

                let email = EmailTokenConfig::from_env();
                assert_eq!(email.token_life_hours, DEFAULT_EMAIL_TOKEN_LIFE_HOURS);
            },
        );
    }

    #[test]
    fn test_key_store_from_env() {
        temp_env::with_vars(
            [
                ("KEY_STORE_BACKEND", Some("s3")),
                ("KEY_STORE_BUCKET", Some("eau-keys")),
                ("KEY_STORE_REGION", Some("eu-west-1")),
                ("JWT_SIGNING_KEY_PATH", None),
                ("KEY_STORE_TIMEOUT_SECS", Some("3")),
            ],
            || {
                let config = KeyStoreConfig::from_env();
                assert_eq!(config.backend, KeyStoreBackend::S3);
                assert_eq!(config.bucket.as_deref(), Some("eau-keys"));
                assert_eq!(config.region.as_deref(), Some("eu-west-1"));
                assert_eq!(config.signing_key_path, "jwt/signing_key.pem");
                assert_eq!(config.timeout(), std::time::Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse::<KeyStoreBackend>().unwrap(), KeyStoreBackend::Memory);
        assert_eq!("FILE".parse::<KeyStoreBackend>().unwrap(), KeyStoreBackend::File);
        assert!("redis".parse::<KeyStoreBackend>().is_err());
    }

    #[test]
    fn test_auth_config_deserialization() {
        let json = r#"{"session":{"refresh_token_life_minutes":5,"access_token_life_minutes":1}}"#;
        let config: AuthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.session.refresh_token_life_minutes, 5);
        assert_eq!(config.email.token_life_hours, 12);
        assert_eq!(config.key_store.backend, KeyStoreBackend::Memory);
    }
}
