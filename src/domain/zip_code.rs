//! Zip code: the topic key of the live notification registry.
//!
//! Events are partitioned by zip code and subscribers register interest in
//! exactly one zip code per subscription. A [`ZipCode`] is only ever built
//! through validation, so the registry never sees an out-of-range topic.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest value in the five-digit zip code space.
pub const MAX_ZIP_CODE: u32 = 99_999;

/// Returned when a raw integer is not a valid five-digit zip code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid zip code {0}: must be between 1 and {MAX_ZIP_CODE}")]
pub struct InvalidZipCode(pub u32);

/// Validated five-digit zip code.
///
/// Comparable and hashable; carries no identity beyond its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u32", into = "u32")]
#[schema(value_type = u32, example = 90210)]
pub struct ZipCode(u32);

impl ZipCode {
    /// Validates and wraps a raw zip code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidZipCode`] if `value` is zero or has more than five
    /// digits.
    pub const fn new(value: u32) -> Result<Self, InvalidZipCode> {
        if value == 0 || value > MAX_ZIP_CODE {
            return Err(InvalidZipCode(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl TryFrom<u32> for ZipCode {
    type Error = InvalidZipCode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ZipCode> for u32 {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}
