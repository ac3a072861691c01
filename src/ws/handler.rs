//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::auth::MaybeCaller;
use crate::domain::ZipCode;
use crate::domain::subscription::resolve_subscriber;
use crate::error::ApiError;

/// Query parameters for `GET /ws/events`.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Zip code to watch.
    pub zip: u32,
    /// Client-chosen identity used when the caller is anonymous.
    #[serde(default)]
    pub subscriber: Option<String>,
}

/// `GET /ws/events`: Upgrade to a live event stream for one zip code.
///
/// The zip code and caller token are validated before the upgrade, so a
/// bad request is answered with a plain HTTP error.
///
/// # Errors
///
/// Returns [`ApiError`] on an out-of-range zip code or invalid token.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let zip = ZipCode::new(query.zip)?;
    let subscriber = resolve_subscriber(
        caller.as_ref().map(|c| c.username.as_str()),
        query.subscriber.as_deref(),
    );

    Ok(ws.on_upgrade(move |socket| {
        let subscription =
            state
                .subscriptions
                .open(zip, subscriber, state.shutdown.clone().wait());
        run_connection(socket, subscription)
    }))
}
