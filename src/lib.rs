//! # eventmap-api
//!
//! REST API for a map of local events, with live notifications delivered
//! over WebSocket to clients watching a zip code.
//!
//! Creating or updating an event publishes it to every live subscriber of
//! the event's zip code. Delivery is best-effort and never blocks the
//! writer: each subscriber has a single-slot buffer, and an event that
//! finds the slot full is dropped for that subscriber.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)        ── Caller (auth/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── EventService (service/)     ── publishes after each write
//!     ├── SubscriptionManager (domain/)
//!     │
//!     ├── TopicRegistry (domain/)     ── zip code → subscriber → slot
//!     │
//!     └── EventStore (persistence/)   ── memory or PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod shutdown;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::AppConfig;

/// Builds the full HTTP application: REST routes, the event stream and
/// the shared middleware stack.
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(api::build_router())
        .merge(ws::routes())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
