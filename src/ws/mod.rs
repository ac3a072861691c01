//! WebSocket layer: the live event stream for one zip code.
//!
//! The endpoint at `/ws/events` opens a single subscription per
//! connection and forwards every event published to that zip code until
//! either side closes.

pub mod connection;
pub mod handler;
pub mod messages;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// WebSocket routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws/events", get(handler::ws_handler))
}
