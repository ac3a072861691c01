//! In-memory event store.
//!
//! Keeps all events in a `HashMap` behind a [`tokio::sync::RwLock`]. Used
//! when PostgreSQL persistence is disabled and throughout the test suite.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{Event, EventDraft, EventId, ZipCode};
use crate::error::ApiError;

/// Event storage backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new event built from `draft`.
    pub async fn create(&self, draft: EventDraft) -> Event {
        let event = Event::from_draft(EventId::new(), draft, Utc::now());
        self.events.write().await.insert(event.id, event.clone());
        event
    }

    /// Overwrites the mutable fields of an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event has the given ID.
    pub async fn update(&self, id: EventId, draft: EventDraft) -> Result<Event, ApiError> {
        let mut map = self.events.write().await;
        let event = map.get_mut(&id).ok_or(ApiError::EventNotFound(id))?;
        event.apply(draft, Utc::now());
        Ok(event.clone())
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event has the given ID.
    pub async fn get(&self, id: EventId) -> Result<Event, ApiError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::EventNotFound(id))
    }

    /// Returns events ordered by start date, optionally restricted to one
    /// zip code.
    pub async fn list(&self, zip: Option<ZipCode>) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events: Vec<Event> = map
            .values()
            .filter(|e| zip.is_none_or(|z| e.zip == z))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start_date, *e.id.as_uuid()));
        events
    }

    /// Removes an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if no event has the given ID.
    pub async fn delete(&self, id: EventId) -> Result<(), ApiError> {
        self.events
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::EventNotFound(id))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::event::tests::draft;

    #[tokio::test]
    async fn create_then_get() {
        let store = InMemoryEventStore::new();
        let created = store.create(draft(90210)).await;
        let Ok(fetched) = store.get(created.id).await else {
            panic!("event should exist");
        };
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = InMemoryEventStore::new();
        let result = store.update(EventId::new(), draft(90210)).await;
        assert!(matches!(result, Err(ApiError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let store = InMemoryEventStore::new();
        let mut late = draft(90210);
        late.start_date += Duration::days(2);
        late.end_date += Duration::days(2);
        let late = store.create(late).await;
        let early = store.create(draft(90210)).await;
        let _other = store.create(draft(10001)).await;

        let Ok(zip) = ZipCode::new(90210) else {
            panic!("valid zip");
        };
        let listed = store.list(Some(zip)).await;
        let ids: Vec<EventId> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
        assert_eq!(store.list(None).await.len(), 3);
    }

    #[tokio::test]
    async fn delete_removes() {
        let store = InMemoryEventStore::new();
        let created = store.create(draft(90210)).await;
        assert!(store.delete(created.id).await.is_ok());
        assert!(store.get(created.id).await.is_err());
        assert!(store.delete(created.id).await.is_err());
    }
}
