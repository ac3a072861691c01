//! WebSocket connection loop.
//!
//! Forwards events from one [`Subscription`] to the client and watches
//! the client side for close. The subscription is torn down when the loop
//! exits, whichever side ended it.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::{READ_ONLY_MESSAGE, WsMessage};
use crate::domain::Subscription;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Sends a `response` envelope acknowledging the subscription.
/// - Forwards each delivered event as an `event` envelope.
/// - Answers client data frames with an `error` envelope.
/// - Sends `Close` when the registry retires the subscription.
pub async fn run_connection(socket: WebSocket, mut subscription: Subscription) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let ticket = subscription.ticket().clone();
    tracing::debug!(topic = %ticket.topic(), subscriber = %ticket.subscriber(), "ws stream opened");

    let hello = WsMessage::subscribed(ticket.topic(), ticket.subscriber());
    if ws_tx.send(Message::text(hello.to_json())).await.is_err() {
        subscription.close().await;
        return;
    }

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        let err = WsMessage::error(400, READ_ONLY_MESSAGE);
                        if ws_tx.send(Message::text(err.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            event = subscription.recv() => {
                let Some(event) = event else {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                let msg = WsMessage::event(&event);
                if ws_tx.send(Message::text(msg.to_json())).await.is_err() {
                    break;
                }
            }
        }
    }

    subscription.close().await;
    tracing::debug!(topic = %ticket.topic(), subscriber = %ticket.subscriber(), "ws stream closed");
}
