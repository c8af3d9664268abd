//! Value objects for the relay domain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for domain value objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("nickname must not be empty")]
    EmptyNickname,
}

/// Opaque identity of one live transport connection.
///
/// Assigned by the transport layer, unique per live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Nickname asserted by a client at connect time.
///
/// Not verified and not guaranteed unique across the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyNickname);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Canonical identifier for the conversation between two nicknames.
///
/// Derived, never stored independently: the lexicographically sorted
/// pair joined by `#`, so the identifier is the same regardless of
/// message direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn between(a: &Nickname, b: &Nickname) -> Self {
        let (lo, hi) = if a.as_str() <= b.as_str() {
            (a, b)
        } else {
            (b, a)
        };
        Self(format!("{}#{}", lo.as_str(), hi.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable 1:1 projection of a live connection.
///
/// The set of presence records is the authoritative "online" view;
/// `connected_at` (UTC millis) supports the deterministic tie-break when
/// several records share a nickname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub connection_id: ConnectionId,
    pub nickname: Nickname,
    pub connected_at: i64,
}

/// One immutable direct message, ordered within its conversation by
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub conversation_id: ConversationId,
    /// RFC 3339 rendering of the creation instant.
    pub timestamp: String,
    /// Creation instant in UTC millis; sort key for retrieval.
    pub created_at: i64,
    pub sender: Nickname,
    pub body: String,
}

/// Opaque pagination token handed back from `query_recent`.
///
/// The core never interprets it; it is passed through to the client and
/// back to the store verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(pub serde_json::Value);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty() {
        // given (precondition): an empty and a blank identity
        // when (operation):
        let empty = ConnectionId::new("".to_string());
        let blank = ConnectionId::new("   ".to_string());

        // then (expected result):
        assert_eq!(empty, Err(DomainError::EmptyConnectionId));
        assert_eq!(blank, Err(DomainError::EmptyConnectionId));
    }

    #[test]
    fn test_nickname_rejects_empty() {
        // given (precondition):
        // when (operation):
        let result = Nickname::new("".to_string());

        // then (expected result):
        assert_eq!(result, Err(DomainError::EmptyNickname));
    }

    #[test]
    fn test_conversation_id_is_symmetric() {
        // given (precondition):
        let alice = Nickname::new("alice".to_string()).unwrap();
        let bob = Nickname::new("bob".to_string()).unwrap();

        // when (operation):
        let ab = ConversationId::between(&alice, &bob);
        let ba = ConversationId::between(&bob, &alice);

        // then (expected result): identical regardless of direction
        assert_eq!(ab, ba);
        assert_eq!(ab.as_str(), "alice#bob");
    }

    #[test]
    fn test_conversation_id_with_self() {
        // given (precondition): both ends are the same nickname
        let alice = Nickname::new("alice".to_string()).unwrap();

        // when (operation):
        let id = ConversationId::between(&alice, &alice);

        // then (expected result):
        assert_eq!(id.as_str(), "alice#alice");
    }
}
