//! JWT (JSON Web Token) validation.
//!
//! Callers present an HMAC-SHA256 token whose claims carry the username.
//! Tokens are minted by the account service; this service validates them
//! and can issue short-lived ones for tooling and tests.
//!
//! # JWT Claims
//!
//! ```json
//! {
//!   "username": "alice",
//!   "exp": 1735689600
//! }
//! ```
//!
//! `sub` is accepted in place of `username`.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Caller's username.
    #[serde(alias = "sub")]
    pub username: String,

    /// Expiration time (Unix timestamp).
    pub exp: u64,
}

/// Validates (and issues) HS256 tokens with a shared secret.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    leeway_secs: u64,
}

impl fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticator {
    /// Creates an authenticator for the given HMAC secret.
    #[must_use]
    pub fn with_secret(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            leeway_secs: 60,
        }
    }

    /// Sets the leeway for the expiration check.
    #[must_use]
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] if the signature, expiry or claims
    /// are invalid.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp"]);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::Forbidden(format!("invalid token: {e}")))
    }

    /// Issues a token for `username` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if signing fails.
    pub fn issue(&self, username: &str, ttl: Duration) -> Result<String, ApiError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let claims = JwtClaims {
            username: username.to_string(),
            exp: now.saturating_add(ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let auth = JwtAuthenticator::with_secret(b"test-secret");
        let Ok(token) = auth.issue("alice", Duration::from_secs(600)) else {
            panic!("signing failed");
        };
        let Ok(claims) = auth.verify(&token) else {
            panic!("token should verify");
        };
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn wrong_secret_is_forbidden() {
        let issuer = JwtAuthenticator::with_secret(b"one");
        let verifier = JwtAuthenticator::with_secret(b"two");
        let Ok(token) = issuer.issue("alice", Duration::from_secs(600)) else {
            panic!("signing failed");
        };
        assert!(matches!(verifier.verify(&token), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn expired_token_is_forbidden() {
        let auth = JwtAuthenticator::with_secret(b"s").with_leeway(0);
        let claims = JwtClaims {
            username: "alice".to_string(),
            exp: 1,
        };
        let Ok(token) = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"s"),
        ) else {
            panic!("signing failed");
        };
        assert!(auth.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_forbidden() {
        let auth = JwtAuthenticator::with_secret(b"s");
        assert!(auth.verify("not-a-jwt").is_err());
    }
}
