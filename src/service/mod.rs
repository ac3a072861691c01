//! Service layer: business logic orchestration.
//!
//! [`EventService`] coordinates event persistence and publishes committed
//! events through the [`super::domain::TopicRegistry`].

pub mod event_service;

pub use event_service::EventService;
