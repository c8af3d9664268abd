//! Wire DTOs, typed by a `type` discriminator on the outbound side and
//! an `action` discriminator on the inbound side.

use serde::{Deserialize, Serialize};

use crate::domain::{ContinuationToken, MessageRecord, PresenceRecord};

/// Minimal probe to pull the `action` out of an inbound frame without
/// committing to a body shape.
#[derive(Debug, Deserialize)]
pub struct ActionProbe {
    pub action: Option<String>,
}

/// Body of a `sendMessage` frame.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub recipient_nickname: String,
    pub message: String,
}

/// Body of a `getMessages` frame. `last_evaluated_key` is the opaque
/// token from a previous reply, passed back verbatim to resume paging.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMessagesBody {
    pub target_nickname: String,
    pub limit: i64,
    pub last_evaluated_key: Option<ContinuationToken>,
}

/// One entry in a presence snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientEntry {
    pub nickname: String,
}

/// A direct message as pushed to its recipient.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectMessage {
    pub sender: String,
    pub message: String,
}

/// A message record as rendered on the wire.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecordDto {
    pub room_id: String,
    pub timestamp: String,
    pub created_at: i64,
    pub sender: String,
    pub message: String,
}

impl From<MessageRecord> for MessageRecordDto {
    fn from(record: MessageRecord) -> Self {
        Self {
            room_id: record.conversation_id.as_str().to_string(),
            timestamp: record.timestamp,
            created_at: record.created_at,
            sender: record.sender.as_str().to_string(),
            message: record.body,
        }
    }
}

/// Reply body for `getMessages`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<MessageRecordDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<ContinuationToken>,
}

/// Every payload the relay pushes to a connection.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundPayload {
    Clients { value: Vec<ClientEntry> },
    Message { value: DirectMessage },
    Messages { value: MessagePage },
    Error { message: String },
}

impl OutboundPayload {
    /// Presence snapshot payload, projected to nicknames.
    pub fn clients(snapshot: &[PresenceRecord]) -> Self {
        Self::Clients {
            value: snapshot
                .iter()
                .map(|r| ClientEntry {
                    nickname: r.nickname.as_str().to_string(),
                })
                .collect(),
        }
    }

    pub fn direct_message(sender: &str, message: &str) -> Self {
        Self::Message {
            value: DirectMessage {
                sender: sender.to_string(),
                message: message.to_string(),
            },
        }
    }

    pub fn messages(
        records: Vec<MessageRecord>,
        last_evaluated_key: Option<ContinuationToken>,
    ) -> Self {
        Self::Messages {
            value: MessagePage {
                messages: records.into_iter().map(Into::into).collect(),
                last_evaluated_key,
            },
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("outbound payload serializes to JSON")
    }
}
