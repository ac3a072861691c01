//! Subscriber identity used as the per-topic registry key.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Key identifying one logical subscription within a topic.
///
/// Authenticated usernames and anonymous client tokens live in separate
/// namespaces (`user:` and `anon:`), so an anonymous client can never name
/// an authenticated entry. The registry never interprets the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Wraps an identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity of an authenticated caller.
    #[must_use]
    pub fn authenticated(username: &str) -> Self {
        Self(format!("user:{username}"))
    }

    /// Identity chosen by an anonymous client.
    #[must_use]
    pub fn anonymous_token(token: &str) -> Self {
        Self(format!("anon:{token}"))
    }

    /// Generates a random anonymous identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::anonymous_token(&uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
