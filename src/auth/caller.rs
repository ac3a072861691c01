//! Caller identity extraction from the `Authorization` header.
//!
//! A missing header means an anonymous caller. A header that is present but
//! does not verify is rejected with 403, never downgraded to anonymous.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::ApiError;

/// An authenticated caller. Extracting it fails with 401 when no token was
/// sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Username from the verified token.
    pub username: String,
}

/// A caller that may be anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeCaller(pub Option<Caller>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ApiError::Forbidden("malformed authorization header".to_string()))?
        .trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token))
}

fn resolve(parts: &Parts, state: &AppState) -> Result<Option<Caller>, ApiError> {
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };
    let claims = state.auth.verify(token)?;
    Ok(Some(Caller {
        username: claims.username,
    }))
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)?.ok_or(ApiError::Unauthorized)
    }
}
