//! Subscription lifecycle: binds one stream request to one registry entry.
//!
//! [`SubscriptionManager::open`] registers the subscriber, hands back a
//! [`Subscription`] immediately and spawns a single listener task that
//! waits for the first of:
//!
//! - the transport's cancellation future (client gone, server shutdown);
//! - an explicit [`Teardown::cancel`] or the [`Subscription`] being dropped.
//!
//! The listener then removes the entry it registered, using the
//! registration's generation so a newer subscription for the same
//! `(topic, subscriber)` pair is left untouched. It holds only a weak
//! reference to the registry and finishes even if the registry is gone.

use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::{oneshot, watch};

use super::topic_registry::{DeliveryHandle, SubscriptionTicket};
use super::{Event, SubscriberId, TopicRegistry, ZipCode};

/// Lifecycle state of one subscription. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Created, not yet registered.
    Pending,
    /// Registered and eligible for delivery.
    Active,
    /// Torn down; the registry no longer targets it.
    Closed,
}

/// What ended a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Cancelled,
    Released,
}

/// Explicit teardown for a subscription. Dropping it also tears down.
#[derive(Debug)]
pub struct Teardown(oneshot::Sender<()>);

impl Teardown {
    /// Requests removal of the registry entry.
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// A live subscription as seen by the transport layer.
#[derive(Debug)]
pub struct Subscription {
    handle: DeliveryHandle,
    teardown: Teardown,
    state: watch::Receiver<SubscriptionState>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` once the entry has been
    /// removed or replaced.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        self.handle.recv().await
    }

    /// Registration details of this subscription.
    #[must_use]
    pub const fn ticket(&self) -> &SubscriptionTicket {
        self.handle.ticket()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    /// Returns a watcher that observes state changes even after the
    /// subscription itself has been dropped.
    #[must_use]
    pub fn state_watcher(&self) -> watch::Receiver<SubscriptionState> {
        self.state.clone()
    }

    /// Tears the subscription down and waits until the entry is removed.
    pub async fn close(self) {
        let Self {
            handle,
            teardown,
            mut state,
        } = self;
        teardown.cancel();
        drop(handle);
        let _ = state.wait_for(|s| *s == SubscriptionState::Closed).await;
    }

    /// Splits into the receive-only stream and its teardown.
    #[must_use]
    pub fn into_parts(self) -> (DeliveryHandle, Teardown) {
        (self.handle, self.teardown)
    }
}

/// Opens subscriptions against a shared [`TopicRegistry`].
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    registry: Arc<TopicRegistry>,
}

impl SubscriptionManager {
    /// Creates a manager over `registry`.
    #[must_use]
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Registers `subscriber` under `topic` and returns without waiting for
    /// any event.
    ///
    /// The entry is removed exactly once, when `cancelled` resolves or the
    /// returned [`Subscription`] is torn down, whichever comes first.
    /// Must be called from within a Tokio runtime.
    pub fn open<F>(&self, topic: ZipCode, subscriber: SubscriberId, cancelled: F) -> Subscription
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(SubscriptionState::Pending);
        let handle = self.registry.subscribe(topic, subscriber);
        state_tx.send_replace(SubscriptionState::Active);

        let (teardown_tx, teardown_rx) = oneshot::channel();
        let ticket = handle.ticket().clone();
        let registry = Arc::downgrade(&self.registry);
        tokio::spawn(listen_for_close(
            registry,
            ticket,
            cancelled,
            teardown_rx,
            state_tx,
        ));

        Subscription {
            handle,
            teardown: Teardown(teardown_tx),
            state: state_rx,
        }
    }
}

async fn listen_for_close<F>(
    registry: Weak<TopicRegistry>,
    ticket: SubscriptionTicket,
    cancelled: F,
    teardown: oneshot::Receiver<()>,
    state: watch::Sender<SubscriptionState>,
) where
    F: Future<Output = ()> + Send,
{
    let reason = tokio::select! {
        () = cancelled => CloseReason::Cancelled,
        _ = teardown => CloseReason::Released,
    };

    let removed = registry
        .upgrade()
        .is_some_and(|registry| registry.unsubscribe_ticket(&ticket));
    state.send_replace(SubscriptionState::Closed);

    tracing::debug!(
        topic = %ticket.topic(),
        subscriber = %ticket.subscriber(),
        generation = ticket.generation(),
        ?reason,
        removed,
        "subscription closed"
    );
}

/// Picks the registry key for a stream request.
///
/// A non-blank authenticated identity always wins; otherwise the client's
/// own non-blank token is used, and a random one is generated when neither
/// is usable. Anonymous tokens are namespaced apart from usernames.
#[must_use]
pub fn resolve_subscriber(identity: Option<&str>, anonymous_token: Option<&str>) -> SubscriberId {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(username) = non_blank(identity) {
        return SubscriberId::authenticated(username);
    }
    non_blank(anonymous_token).map_or_else(SubscriberId::anonymous, SubscriberId::anonymous_token)
}
