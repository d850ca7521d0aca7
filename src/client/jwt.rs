//! Bearer token inspection
//!
//! Tokens are treated as JWTs for the sole purpose of reading `exp`. The
//! signature is never checked; the backend remains the authority.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Why a token's claims could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("token payload is not valid base64url: {0}")]
    Base64(String),

    #[error("token payload is not valid JSON: {0}")]
    Json(String),

    #[error("token expiry is out of range")]
    InvalidExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    /// Seconds since the epoch; some issuers emit fractions
    exp: f64,
}

/// Decode base64url (URL-safe base64, padding optional)
fn base64_decode_url(input: &str) -> Result<Vec<u8>, TokenDecodeError> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| TokenDecodeError::Base64(e.to_string()))
}

/// Read the `exp` claim of a token.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>, TokenDecodeError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenDecodeError::Malformed);
    }

    let payload_bytes = base64_decode_url(parts[1])?;
    let claims: Claims = serde_json::from_slice(&payload_bytes)
        .map_err(|e| TokenDecodeError::Json(e.to_string()))?;

    let millis = (claims.exp * 1000.0).round();
    if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(TokenDecodeError::InvalidExpiry);
    }
    DateTime::from_timestamp_millis(millis as i64).ok_or(TokenDecodeError::InvalidExpiry)
}

/// Build an unsigned token with the given expiry, for tests across the crate.
#[cfg(test)]
pub fn test_token(exp: i64) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"42","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}
