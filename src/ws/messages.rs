//! WebSocket message envelope sent from server to client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Event, SubscriberId, ZipCode};

/// Text sent back for any client data frame.
pub const READ_ONLY_MESSAGE: &str = "the event stream is read-only";

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Server-generated message id.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Subscription acknowledgement.
    Response,
    /// A created or updated event.
    Event,
    /// Error report.
    Error,
}

impl WsMessage {
    fn new(msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Acknowledges an opened subscription.
    #[must_use]
    pub fn subscribed(zip: ZipCode, subscriber: &SubscriberId) -> Self {
        Self::new(
            WsMessageType::Response,
            serde_json::json!({
                "subscribed": zip,
                "subscriber": subscriber,
            }),
        )
    }

    /// Wraps a delivered event.
    #[must_use]
    pub fn event(event: &Event) -> Self {
        Self::new(
            WsMessageType::Event,
            serde_json::to_value(event).unwrap_or_default(),
        )
    }

    /// Reports an error with an HTTP-like status code.
    #[must_use]
    pub fn error(code: u16, message: &str) -> Self {
        Self::new(
            WsMessageType::Error,
            serde_json::json!({
                "code": code,
                "message": message,
            }),
        )
    }

    /// Serializes to a JSON text frame body.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::tests::draft;
    use crate::domain::EventId;

    #[test]
    fn subscribed_envelope_shape() {
        let Ok(zip) = ZipCode::new(501) else {
            panic!("valid zip");
        };
        let msg = WsMessage::subscribed(zip, &SubscriberId::new("alice"));
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&msg.to_json()) else {
            panic!("envelope should be JSON");
        };
        assert_eq!(value.get("type"), Some(&serde_json::json!("response")));
        let payload = value.get("payload");
        assert_eq!(
            payload.and_then(|p| p.get("subscribed")),
            Some(&serde_json::json!(501))
        );
        assert_eq!(
            payload.and_then(|p| p.get("subscriber")),
            Some(&serde_json::json!("alice"))
        );
    }

    #[test]
    fn event_envelope_carries_event() {
        let event = Event::from_draft(EventId::new(), draft(90210), Utc::now());
        let msg = WsMessage::event(&event);
        assert_eq!(msg.msg_type, WsMessageType::Event);
        assert_eq!(msg.payload.get("zip"), Some(&serde_json::json!(90210)));
        assert_eq!(
            msg.payload.get("id"),
            Some(&serde_json::json!(event.id.to_string()))
        );
    }

    #[test]
    fn error_envelope() {
        let msg = WsMessage::error(400, READ_ONLY_MESSAGE);
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(
            msg.payload.get("message"),
            Some(&serde_json::json!(READ_ONLY_MESSAGE))
        );
    }
}
