//! Authorization header parsing

use crate::errors::TokenError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization: Bearer <token>` header value
///
/// # Arguments
///
/// * `header` - Raw header value, `None` when the header is absent
///
/// # Returns
///
/// * `Ok(&str)` - The token, without the scheme prefix
/// * `Err(TokenError::InvalidAuthorizationHeader)` - Header missing or not a bearer credential
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| TokenError::InvalidAuthorizationHeader {
            message: "authorization header not found".to_string(),
        })?;

    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.contains(' '))
        .ok_or_else(|| TokenError::InvalidAuthorizationHeader {
            message: "Bearer token not found in authorization header".to_string(),
        })
}
