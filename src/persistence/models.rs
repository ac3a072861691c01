//! Database row model for the `events` table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Event, EventId, ZipCode};
use crate::error::ApiError;

/// Column list shared by every `SELECT` / `RETURNING` clause, in the order
/// of [`EventRecord`].
pub const EVENT_COLUMNS: &str = "id, name, description, address_line1, address_line2, city, \
     state, zip, latitude, longitude, start_date, end_date, created_at, updated_at";

/// Raw tuple decoded from an `events` row.
pub type EventRecord = (
    Uuid,
    String,
    String,
    String,
    String,
    String,
    String,
    i32,
    f64,
    f64,
    DateTime<Utc>,
    DateTime<Utc>,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Converts a decoded row into a domain [`Event`].
///
/// # Errors
///
/// Returns [`ApiError::Persistence`] if the stored zip code is outside the
/// valid range.
pub fn event_from_record(record: EventRecord) -> Result<Event, ApiError> {
    let (
        id,
        name,
        description,
        address_line1,
        address_line2,
        city,
        state,
        zip,
        latitude,
        longitude,
        start_date,
        end_date,
        created_at,
        updated_at,
    ) = record;

    let zip = u32::try_from(zip)
        .ok()
        .and_then(|z| ZipCode::new(z).ok())
        .ok_or_else(|| ApiError::Persistence(format!("stored zip code out of range: {zip}")))?;

    Ok(Event {
        id: EventId::from_uuid(id),
        name,
        description,
        address_line1,
        address_line2,
        city,
        state,
        zip,
        latitude,
        longitude,
        start_date,
        end_date,
        created_at,
        updated_at,
    })
}

/// Zip code as stored in the `integer` column.
#[must_use]
pub fn zip_column(zip: ZipCode) -> i32 {
    // Five-digit zip codes always fit.
    i32::try_from(zip.get()).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn record(zip: i32) -> EventRecord {
        let now = Utc::now();
        (
            Uuid::new_v4(),
            "Picnic".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            zip,
            0.0,
            0.0,
            now,
            now,
            now,
            now,
        )
    }

    #[test]
    fn converts_valid_row() {
        let Ok(event) = event_from_record(record(90210)) else {
            panic!("row should convert");
        };
        assert_eq!(event.zip.get(), 90210);
        assert_eq!(zip_column(event.zip), 90210);
    }

    #[test]
    fn rejects_corrupt_zip() {
        assert!(matches!(
            event_from_record(record(-5)),
            Err(ApiError::Persistence(_))
        ));
    }
}
