//! Session token entities for JWT-based authentication.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::TokenError;

/// Caller-supplied claims: arbitrary string keys with JSON scalar values
pub type ClaimMap = serde_json::Map<String, Value>;

/// Claim names injected by the token service; never taken from callers
pub const RESERVED_CLAIMS: [&str; 4] = ["exp", "iat", "jti", "token_type"];

/// Kind of session token
///
/// Both kinds share one wire structure; they differ in the `token_type`
/// claim and the lifetime applied at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Refresh,
    Access,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Refresh => "refresh",
            TokenType::Access => "access",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for the session token payload
///
/// Reserved claims are typed fields; everything the caller supplied travels
/// in `extra` and is flattened into the same JSON object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issued at timestamp (Unix seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix seconds)
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Refresh or access
    pub token_type: TokenType,

    /// Caller-supplied claims
    #[serde(flatten)]
    pub extra: ClaimMap,
}

impl SessionClaims {
    /// Builds a fresh claim set from caller claims
    ///
    /// The caller's map is only read; reserved keys it may carry are dropped
    /// from the copy and replaced by freshly computed values.
    ///
    /// # Arguments
    ///
    /// * `claims` - Caller-supplied claims
    /// * `token_type` - Kind of token being issued
    /// * `issued_at` - Current time as seen by the issuing service
    /// * `lifetime` - Kind-specific lifetime
    ///
    /// Fails when the expiry instant cannot be represented.
    pub fn issue(
        claims: &ClaimMap,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at.checked_add_signed(lifetime).ok_or_else(|| {
            TokenError::TokenGenerationFailed {
                message: format!("{} token expiry out of range", token_type),
            }
        })?;

        Ok(Self {
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            extra: copy_token_claims(claims),
        })
    }

    /// Looks up a caller-supplied claim
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiry as a timestamp, if representable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Flattens the claim set back into a single map, reserved keys included
    pub fn to_claim_map(&self) -> ClaimMap {
        let mut map = self.extra.clone();
        map.insert("iat".to_string(), Value::from(self.iat));
        map.insert("exp".to_string(), Value::from(self.exp));
        map.insert("jti".to_string(), Value::from(self.jti.clone()));
        map.insert("token_type".to_string(), Value::from(self.token_type.as_str()));
        map
    }
}

/// Copies caller claims, skipping every reserved key
pub fn copy_token_claims(claims: &ClaimMap) -> ClaimMap {
    claims
        .iter()
        .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_copy_strips_reserved_claims() {
        let input = claims(json!({
            "username": "alice",
            "exp": 1,
            "iat": 2,
            "jti": "old",
            "token_type": "refresh",
        }));

        let copied = copy_token_claims(&input);

        assert_eq!(copied.len(), 1);
        assert_eq!(copied["username"], "alice");
        // Input untouched
        assert_eq!(input.len(), 5);
    }

    #[test]
    fn test_issue_access_claims() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let input = claims(json!({"username": "alice", "exp": 0}));

        let issued = SessionClaims::issue(&input, TokenType::Access, now, Duration::minutes(15)).unwrap();

        assert_eq!(issued.iat, now.timestamp());
        assert_eq!(issued.exp, now.timestamp() + 15 * 60);
        assert_eq!(issued.token_type, TokenType::Access);
        assert_eq!(issued.get("username"), Some(&json!("alice")));
        assert!(Uuid::parse_str(&issued.jti).is_ok());
        assert_eq!(input["exp"], 0);
    }

    #[test]
    fn test_unique_jti() {
        let now = Utc::now();
        let a = SessionClaims::issue(&ClaimMap::new(), TokenType::Refresh, now, Duration::days(7)).unwrap();
        let b = SessionClaims::issue(&ClaimMap::new(), TokenType::Refresh, now, Duration::days(7)).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_unrepresentable_expiry_rejected() {
        let err = SessionClaims::issue(
            &ClaimMap::new(),
            TokenType::Refresh,
            DateTime::<Utc>::MAX_UTC,
            Duration::minutes(1),
        )
        .unwrap_err();

        assert!(matches!(err, TokenError::TokenGenerationFailed { .. }));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let issued = SessionClaims::issue(&ClaimMap::new(), TokenType::Access, now, Duration::minutes(15)).unwrap();

        assert!(!issued.is_expired_at(now + Duration::minutes(15) - Duration::seconds(1)));
        assert!(issued.is_expired_at(now + Duration::minutes(15)));
        assert_eq!(issued.expires_at(), Some(now + Duration::minutes(15)));
    }

    #[test]
    fn test_wire_shape_is_flat() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let input = claims(json!({"username": "alice", "admin": false}));
        let issued = SessionClaims::issue(&input, TokenType::Access, now, Duration::minutes(15)).unwrap();

        let value = serde_json::to_value(&issued).unwrap();
        assert_eq!(value["token_type"], "access");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["admin"], false);
        assert!(value.get("extra").is_none());

        let back: SessionClaims = serde_json::from_value(value).unwrap();
        assert_eq!(back, issued);
        assert_eq!(back.to_claim_map()["token_type"], "access");
    }
}
