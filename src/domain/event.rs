//! Event records and the validated input they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, ZipCode};
use crate::error::ApiError;

/// Maximum length of an event name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// A persisted event.
///
/// Instances only exist after a successful store write; this is the record
/// pushed to live subscribers of [`Event::zip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// First street address line.
    pub address_line1: String,
    /// Second street address line.
    pub address_line2: String,
    /// City name.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Zip code; the notification topic of this event.
    pub zip: ZipCode,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event.
    pub end_date: DateTime<Utc>,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied event fields for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Display name (1..=200 characters).
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// First street address line.
    #[serde(default)]
    pub address_line1: String,
    /// Second street address line.
    #[serde(default)]
    pub address_line2: String,
    /// City name.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Zip code.
    pub zip: ZipCode,
    /// Latitude in decimal degrees (-90..=90).
    #[serde(default)]
    pub latitude: f64,
    /// Longitude in decimal degrees (-180..=180).
    #[serde(default)]
    pub longitude: f64,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event; must not precede `start_date`.
    pub end_date: DateTime<Utc>,
}

impl EventDraft {
    /// Checks field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), ApiError> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            return Err(ApiError::InvalidRequest("name must not be empty".to_string()));
        }
        if name_len > MAX_NAME_LEN {
            return Err(ApiError::InvalidRequest(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ApiError::InvalidRequest(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ApiError::InvalidRequest(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if self.end_date < self.start_date {
            return Err(ApiError::InvalidRequest(
                "endDate must not precede startDate".to_string(),
            ));
        }
        Ok(())
    }
}

impl Event {
    /// Builds a fresh event from a draft, stamping both timestamps with `now`.
    #[must_use]
    pub fn from_draft(id: EventId, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            address_line1: draft.address_line1,
            address_line2: draft.address_line2,
            city: draft.city,
            state: draft.state,
            zip: draft.zip,
            latitude: draft.latitude,
            longitude: draft.longitude,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field with the draft's values.
    pub fn apply(&mut self, draft: EventDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.address_line1 = draft.address_line1;
        self.address_line2 = draft.address_line2;
        self.city = draft.city;
        self.state = draft.state;
        self.zip = draft.zip;
        self.latitude = draft.latitude;
        self.longitude = draft.longitude;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.updated_at = now;
    }
}
