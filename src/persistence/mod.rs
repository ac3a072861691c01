//! Persistence layer: where committed events live.
//!
//! [`EventStore`] selects between the in-memory backend and the PostgreSQL
//! backend (`sqlx::PgPool`) at startup. Every write returns the committed
//! [`Event`]; only such records are ever handed to the notification
//! registry.

pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

use crate::domain::{Event, EventDraft, EventId, ZipCode};
use crate::error::ApiError;

/// Event storage backend.
#[derive(Debug, Clone)]
pub enum EventStore {
    /// Process-local storage.
    Memory(Arc<InMemoryEventStore>),
    /// PostgreSQL storage.
    Postgres(PostgresEventStore),
}

impl EventStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::Memory(Arc::new(InMemoryEventStore::new()))
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Persists a new event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn create(&self, draft: EventDraft) -> Result<Event, ApiError> {
        match self {
            Self::Memory(store) => Ok(store.create(draft).await),
            Self::Postgres(store) => store.create(draft).await,
        }
    }

    /// Overwrites an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or [`ApiError::Persistence`].
    pub async fn update(&self, id: EventId, draft: EventDraft) -> Result<Event, ApiError> {
        match self {
            Self::Memory(store) => store.update(id, draft).await,
            Self::Postgres(store) => store.update(id, draft).await,
        }
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or [`ApiError::Persistence`].
    pub async fn get(&self, id: EventId) -> Result<Event, ApiError> {
        match self {
            Self::Memory(store) => store.get(id).await,
            Self::Postgres(store) => store.get(id).await,
        }
    }

    /// Lists events, optionally for one zip code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn list(&self, zip: Option<ZipCode>) -> Result<Vec<Event>, ApiError> {
        match self {
            Self::Memory(store) => Ok(store.list(zip).await),
            Self::Postgres(store) => store.list(zip).await,
        }
    }

    /// Deletes an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or [`ApiError::Persistence`].
    pub async fn delete(&self, id: EventId) -> Result<(), ApiError> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Postgres(store) => store.delete(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_backend_name() {
        assert_eq!(EventStore::in_memory().backend(), "memory");
    }
}
