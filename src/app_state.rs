//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::JwtAuthenticator;
use crate::domain::{SubscriptionManager, TopicRegistry};
use crate::persistence::EventStore;
use crate::service::EventService;
use crate::shutdown::ShutdownSignal;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event service for all CRUD operations and publishing.
    pub event_service: Arc<EventService>,
    /// Opens live subscriptions for WebSocket clients.
    pub subscriptions: SubscriptionManager,
    /// Validates caller tokens.
    pub auth: Arc<JwtAuthenticator>,
    /// Cancellation signal shared by every open event stream.
    pub shutdown: ShutdownSignal,
}

impl AppState {
    /// Wires the service and subscription layers around one registry.
    #[must_use]
    pub fn new(store: EventStore, auth: JwtAuthenticator, shutdown: ShutdownSignal) -> Self {
        let registry = Arc::new(TopicRegistry::new());
        Self {
            event_service: Arc::new(EventService::new(store, Arc::clone(&registry))),
            subscriptions: SubscriptionManager::new(registry),
            auth: Arc::new(auth),
            shutdown,
        }
    }

    /// Returns the notification registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        self.subscriptions.registry()
    }
}
