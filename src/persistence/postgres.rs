//! PostgreSQL implementation of the event store.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{EVENT_COLUMNS, EventRecord, event_from_record, zip_column};
use crate::config::AppConfig;
use crate::domain::{Event, EventDraft, EventId, ZipCode};
use crate::error::ApiError;

const CREATE_EVENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    address_line1 TEXT NOT NULL DEFAULT '',
    address_line2 TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    zip INTEGER NOT NULL,
    latitude DOUBLE PRECISION NOT NULL,
    longitude DOUBLE PRECISION NOT NULL,
    start_date TIMESTAMPTZ NOT NULL,
    end_date TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

const CREATE_ZIP_INDEX: &str = "CREATE INDEX IF NOT EXISTS events_zip_idx ON events (zip)";

/// PostgreSQL-backed event store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool with the configured limits and makes sure
    /// the `events` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] if the database is unreachable or
    /// the schema cannot be created.
    pub async fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Creates the `events` table and its zip index if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), ApiError> {
        sqlx::query(CREATE_EVENTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_ZIP_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a new event built from `draft`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn create(&self, draft: EventDraft) -> Result<Event, ApiError> {
        let event = Event::from_draft(EventId::new(), draft, Utc::now());

        sqlx::query(
            "INSERT INTO events (id, name, description, address_line1, address_line2, city, \
             state, zip, latitude, longitude, start_date, end_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.address_line1)
        .bind(&event.address_line2)
        .bind(&event.city)
        .bind(&event.state)
        .bind(zip_column(event.zip))
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    /// Overwrites the mutable columns of an event and returns the new row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no row matches, or
    /// [`ApiError::Persistence`] on database failure.
    pub async fn update(&self, id: EventId, draft: EventDraft) -> Result<Event, ApiError> {
        let sql = format!(
            "UPDATE events SET name = $2, description = $3, address_line1 = $4, \
             address_line2 = $5, city = $6, state = $7, zip = $8, latitude = $9, \
             longitude = $10, start_date = $11, end_date = $12, updated_at = $13 \
             WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(id.as_uuid())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.address_line1)
            .bind(&draft.address_line2)
            .bind(&draft.city)
            .bind(&draft.state)
            .bind(zip_column(draft.zip))
            .bind(draft.latitude)
            .bind(draft.longitude)
            .bind(draft.start_date)
            .bind(draft.end_date)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::EventNotFound(id))?;

        event_from_record(record)
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no row matches, or
    /// [`ApiError::Persistence`] on database failure.
    pub async fn get(&self, id: EventId) -> Result<Event, ApiError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::EventNotFound(id))?;

        event_from_record(record)
    }

    /// Returns events ordered by start date, optionally restricted to one
    /// zip code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn list(&self, zip: Option<ZipCode>) -> Result<Vec<Event>, ApiError> {
        let records = if let Some(zip) = zip {
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE zip = $1 ORDER BY start_date ASC, id ASC"
            );
            sqlx::query_as::<_, EventRecord>(&sql)
                .bind(zip_column(zip))
                .fetch_all(&self.pool)
                .await?
        } else {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date ASC, id ASC");
            sqlx::query_as::<_, EventRecord>(&sql)
                .fetch_all(&self.pool)
                .await?
        };

        records.into_iter().map(event_from_record).collect()
    }

    /// Deletes an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no row matches, or
    /// [`ApiError::Persistence`] on database failure.
    pub async fn delete(&self, id: EventId) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::EventNotFound(id));
        }
        Ok(())
    }
}
