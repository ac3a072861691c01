//! Domain layer: event records, topic keys, and live notification plumbing.
//!
//! This module contains the event model, the zip-code topic key, the
//! [`TopicRegistry`] that fans published events out to subscribers, and the
//! [`SubscriptionManager`] that ties each subscription to the lifetime of
//! its transport connection.

pub mod event;
pub mod event_id;
pub mod subscriber_id;
pub mod subscription;
pub mod topic_registry;
pub mod zip_code;

pub use event::{Event, EventDraft};
pub use event_id::EventId;
pub use subscriber_id::SubscriberId;
pub use subscription::{Subscription, SubscriptionManager, SubscriptionState};
pub use topic_registry::{DeliveryHandle, PublishReport, RegistryStats, TopicRegistry};
pub use zip_code::ZipCode;
