//! Event service: persists events and notifies live subscribers.

use std::sync::Arc;

use crate::domain::{Event, EventDraft, EventId, TopicRegistry, ZipCode};
use crate::error::ApiError;
use crate::persistence::EventStore;

/// Orchestration layer for all event operations.
///
/// Every mutation follows the pattern: validate → write to the store →
/// publish the committed record to the event's zip code. A publish is only
/// attempted after the write has succeeded, and its outcome never affects
/// the caller's result.
#[derive(Debug, Clone)]
pub struct EventService {
    store: EventStore,
    registry: Arc<TopicRegistry>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: EventStore, registry: Arc<TopicRegistry>) -> Self {
        Self { store, registry }
    }

    /// Returns the notification registry events are published to.
    #[must_use]
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Creates an event and notifies subscribers of its zip code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an invalid draft or
    /// [`ApiError::Persistence`] if the write fails; nothing is published
    /// in either case.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, ApiError> {
        draft.validate()?;
        let event = self.store.create(draft).await?;
        tracing::info!(event_id = %event.id, zip = %event.zip, "event created");
        self.notify(&event);
        Ok(event)
    }

    /// Updates an event and notifies subscribers of its (new) zip code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`], [`ApiError::EventNotFound`] or
    /// [`ApiError::Persistence`]; nothing is published in those cases.
    pub async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event, ApiError> {
        draft.validate()?;
        let event = self.store.update(id, draft).await?;
        tracing::info!(event_id = %event.id, zip = %event.zip, "event updated");
        self.notify(&event);
        Ok(event)
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or [`ApiError::Persistence`].
    pub async fn get_event(&self, id: EventId) -> Result<Event, ApiError> {
        self.store.get(id).await
    }

    /// Lists events, optionally restricted to one zip code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on storage failure.
    pub async fn list_events(&self, zip: Option<ZipCode>) -> Result<Vec<Event>, ApiError> {
        self.store.list(zip).await
    }

    /// Deletes an event. Deletions are not published.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] or [`ApiError::Persistence`].
    pub async fn delete_event(&self, id: EventId) -> Result<(), ApiError> {
        self.store.delete(id).await?;
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    fn notify(&self, event: &Event) {
        let report = self
            .registry
            .publish(event.zip, Arc::new(event.clone()));
        if report.delivered > 0 || report.dropped > 0 {
            tracing::debug!(
                event_id = %event.id,
                zip = %event.zip,
                delivered = report.delivered,
                dropped = report.dropped,
                "event published"
            );
        }
    }
}
