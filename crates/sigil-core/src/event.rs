//! Inbound events delivered by the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jid::Jid;
use crate::payload::MessagePayload;

/// Envelope metadata of a received message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub id: String,
    pub chat: Jid,
    pub sender: Jid,
    #[serde(default)]
    pub is_from_me: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub push_name: String,
    /// Unix timestamp in seconds, when the transport provides one.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A received message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub info: MessageInfo,
    /// `None` for protocol-only messages that carry no body.
    #[serde(default)]
    pub message: Option<MessagePayload>,
}

/// Counters announced before offline messages are replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPreview {
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub notifications: u64,
    #[serde(default)]
    pub receipts: u64,
}

/// An event identified only by name, for `ev` triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEvent {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

impl NamedEvent {
    /// Creates a named event without data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Value::Null,
        }
    }
}

/// Everything the transport can deliver to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A chat message.
    Message(MessageEvent),
    /// Offline replay is about to start.
    OfflineSyncPreview(SyncPreview),
    /// Offline replay finished; the bot may start answering commands.
    OfflineSyncCompleted,
    /// Any other event, dispatched by name.
    Named(NamedEvent),
}

impl InboundEvent {
    /// A short name for logging.
    pub fn event_name(&self) -> &str {
        match self {
            Self::Message(_) => "message",
            Self::OfflineSyncPreview(_) => "offline_sync_preview",
            Self::OfflineSyncCompleted => "offline_sync_completed",
            Self::Named(event) => &event.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_shape() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"message","info":{"id":"A1","chat":"1@s.whatsapp.net","sender":"1@s.whatsapp.net","pushName":"Ann"},"message":{"conversation":".ping"}}"#,
        )
        .unwrap();
        let InboundEvent::Message(msg) = &event else {
            panic!("expected a message event");
        };
        assert_eq!(msg.info.push_name, "Ann");
        assert_eq!(event.event_name(), "message");

        let done: InboundEvent = serde_json::from_str(r#"{"type":"offline_sync_completed"}"#).unwrap();
        assert_eq!(done, InboundEvent::OfflineSyncCompleted);

        let named: InboundEvent =
            serde_json::from_str(r#"{"type":"named","name":"group.join","data":{"n":1}}"#).unwrap();
        assert_eq!(named.event_name(), "group.join");
    }
}
