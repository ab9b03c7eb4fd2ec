//! Access token inspection
//!
//! The client never holds the signing secret, so tokens are only decoded to
//! read their claims; the server remains the one validating signatures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{ClientError, ClientResult};

/// Claims the client cares about
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn unverified() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Decodes the payload of `token` without checking its signature
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> ClientResult<T> {
    decode::<T>(token, &DecodingKey::from_secret(&[]), &unverified())
        .map(|data| data.claims)
        .map_err(|e| ClientError::InvalidResponse(format!("Malformed token: {}", e)))
}

/// Expiration instant of `token`, if it is readable and carries `exp`
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let claims: TokenClaims = decode_claims(token).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

/// Whether `token` expires within `leeway` from now
///
/// Unreadable tokens count as expired; tokens without `exp` never expire.
pub fn is_expired(token: &str, leeway: Duration) -> bool {
    match decode_claims::<TokenClaims>(token) {
        Ok(claims) => match claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single()) {
            Some(expiry) => expiry <= Utc::now() + leeway,
            None => false,
        },
        Err(_) => true,
    }
}
