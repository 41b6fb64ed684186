//! Configuration for the session token service

use chrono::Duration;
use eau_shared::{SessionTokenConfig, MAX_TOKEN_LIFE_MINUTES};
use jsonwebtoken::Algorithm;

use crate::errors::ValidationError;

/// Configuration for the session token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in minutes
    pub access_token_life_minutes: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_life_minutes: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&SessionTokenConfig::default())
    }
}

impl From<&SessionTokenConfig> for TokenServiceConfig {
    fn from(config: &SessionTokenConfig) -> Self {
        Self {
            algorithm: Algorithm::PS256,
            access_token_life_minutes: config.access_token_life_minutes,
            refresh_token_life_minutes: config.refresh_token_life_minutes,
        }
    }
}

impl TokenServiceConfig {
    /// Checks both lifetimes lie in `1..=MAX_TOKEN_LIFE_MINUTES`
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.access_token_life()?;
        self.refresh_token_life()?;
        Ok(())
    }

    pub fn access_token_life(&self) -> Result<Duration, ValidationError> {
        lifetime_minutes("access_token_life_minutes", self.access_token_life_minutes)
    }

    pub fn refresh_token_life(&self) -> Result<Duration, ValidationError> {
        lifetime_minutes("refresh_token_life_minutes", self.refresh_token_life_minutes)
    }
}

fn lifetime_minutes(field: &str, minutes: i64) -> Result<Duration, ValidationError> {
    let invalid = || ValidationError::InvalidLifetime {
        field: field.to_string(),
        value: minutes,
    };

    if !(1..=MAX_TOKEN_LIFE_MINUTES).contains(&minutes) {
        return Err(invalid());
    }
    Duration::try_minutes(minutes).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = TokenServiceConfig::default();
        assert_eq!(config.algorithm, Algorithm::PS256);
        assert_eq!(config.access_token_life().unwrap(), Duration::minutes(15));
        assert_eq!(config.refresh_token_life().unwrap(), Duration::minutes(10080));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_lifetimes_rejected() {
        for minutes in [0, -1, MAX_TOKEN_LIFE_MINUTES + 1, 1_000_000_000_000_000, i64::MAX] {
            let config = TokenServiceConfig {
                refresh_token_life_minutes: minutes,
                ..TokenServiceConfig::default()
            };
            assert_eq!(
                config.validate().unwrap_err(),
                ValidationError::InvalidLifetime {
                    field: "refresh_token_life_minutes".to_string(),
                    value: minutes,
                }
            );
        }
    }
}
