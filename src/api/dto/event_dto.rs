//! Event DTOs: list query and list envelope.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{Page, PaginationMeta};
use crate::domain::{Event, ZipCode};
use crate::error::ApiError;

/// Query parameters for `GET /events`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Only return events in this zip code.
    pub zip: Option<u32>,
    /// Page number (1-indexed). Defaults to 1.
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    pub per_page: Option<u32>,
}

impl EventListQuery {
    /// Validates the zip filter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidZipCode`] if `zip` is out of range.
    pub fn zip(&self) -> Result<Option<ZipCode>, ApiError> {
        self.zip
            .map(ZipCode::new)
            .transpose()
            .map_err(ApiError::from)
    }

    /// Returns the normalized pagination window.
    #[must_use]
    pub fn page(&self) -> Page {
        Page::clamped(self.page, self.per_page)
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page, ordered by start date.
    pub data: Vec<Event>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_zip() {
        let query = EventListQuery {
            zip: Some(100_000),
            ..EventListQuery::default()
        };
        assert!(matches!(query.zip(), Err(ApiError::InvalidZipCode(_))));
    }

    #[test]
    fn missing_zip_lists_everything() {
        assert!(matches!(EventListQuery::default().zip(), Ok(None)));
    }
}
