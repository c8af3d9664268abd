//! UseCase: direct message between two nicknames.
//!
//! Appends the immutable message record, then best-effort notifies the
//! recipient's live connection if there is one. A recipient who is not
//! online is not an error; the message still lands in history.

use std::sync::Arc;

use banter_shared::time::{millis_to_rfc3339, Clock};

use crate::domain::{
    ConnectionId, ConversationId, ConversationStore, DeliveryChannel, MessageRecord, Nickname,
    PresenceStore,
};
use crate::infrastructure::dto::websocket::{OutboundPayload, SendMessageBody};

use super::{RelayError, SessionResolver};

pub struct SendMessageUseCase {
    resolver: SessionResolver,
    presence: Arc<dyn PresenceStore>,
    conversations: Arc<dyn ConversationStore>,
    channel: Arc<dyn DeliveryChannel>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        conversations: Arc<dyn ConversationStore>,
        channel: Arc<dyn DeliveryChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: SessionResolver::new(presence.clone()),
            presence,
            conversations,
            channel,
            clock,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: Option<&str>,
    ) -> Result<(), RelayError> {
        // Session first: an unregistered sender fails before the
        // payload is even looked at, and nothing is appended.
        let sender = self.resolver.resolve(connection_id).await?;

        let body = parse_body(payload)?;
        let recipient = Nickname::new(body.recipient_nickname)
            .map_err(|_| RelayError::InvalidPayload("invalid SendMessageBody".to_string()))?;

        let conversation_id = ConversationId::between(&sender.nickname, &recipient);
        let created_at = self.clock.now_millis();
        let record = MessageRecord {
            conversation_id: conversation_id.clone(),
            timestamp: millis_to_rfc3339(created_at),
            created_at,
            sender: sender.nickname.clone(),
            body: body.message.clone(),
        };
        self.conversations.append(record).await?;
        tracing::debug!(
            "Appended message from '{}' to conversation '{}'",
            sender.nickname.as_str(),
            conversation_id.as_str()
        );

        // Deliver to the recipient's live connection, if any.
        if let Some(recipient_connection) = self.presence.find_by_nickname(&recipient).await? {
            let notification =
                OutboundPayload::direct_message(sender.nickname.as_str(), &body.message).to_json();
            self.channel
                .send(&recipient_connection, &notification)
                .await?;
        }

        Ok(())
    }
}

fn parse_body(payload: Option<&str>) -> Result<SendMessageBody, RelayError> {
    let invalid = || RelayError::InvalidPayload("invalid SendMessageBody".to_string());
    let body: SendMessageBody =
        serde_json::from_str(payload.unwrap_or("{}")).map_err(|_| invalid())?;
    if body.message.trim().is_empty() {
        return Err(invalid());
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryOutcome, MockDeliveryChannel, PresenceRecord};
    use crate::infrastructure::repository::{InMemoryConversationStore, InMemoryPresenceStore};
    use banter_shared::time::FixedClock;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn nick(name: &str) -> Nickname {
        Nickname::new(name.to_string()).unwrap()
    }

    async fn seed(store: &InMemoryPresenceStore, id: &str, nickname: &str) {
        store
            .put(PresenceRecord {
                connection_id: conn(id),
                nickname: nick(nickname),
                connected_at: 1000,
            })
            .await
            .unwrap();
    }

    fn usecase_with(
        presence: Arc<InMemoryPresenceStore>,
        conversations: Arc<InMemoryConversationStore>,
        channel: MockDeliveryChannel,
    ) -> SendMessageUseCase {
        SendMessageUseCase::new(
            presence,
            conversations,
            Arc::new(channel),
            Arc::new(FixedClock::new(42_000)),
        )
    }

    #[tokio::test]
    async fn test_send_message_appends_and_notifies_recipient() {
        // given (precondition): alice (c1) and bob (c2) are registered
        let presence = Arc::new(InMemoryPresenceStore::new());
        seed(&presence, "c1", "alice").await;
        seed(&presence, "c2", "bob").await;
        let conversations = Arc::new(InMemoryConversationStore::new());

        let mut channel = MockDeliveryChannel::new();
        channel
            .expect_send()
            .withf(|id, payload| {
                id.as_str() == "c2"
                    && payload == r#"{"type":"message","value":{"sender":"alice","message":"hi"}}"#
            })
            .times(1)
            .returning(|_, _| Ok(DeliveryOutcome::Delivered));

        let usecase = usecase_with(presence, conversations.clone(), channel);

        // when (operation):
        let result = usecase
            .execute(
                &conn("c1"),
                Some(r#"{"recipientNickname":"bob","message":"hi"}"#),
            )
            .await;

        // then (expected result): record exists under alice#bob
        assert!(result.is_ok());
        let (page, _) = conversations
            .query_recent(
                &ConversationId::between(&nick("alice"), &nick("bob")),
                i64::MAX,
                10,
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sender, nick("alice"));
        assert_eq!(page[0].body, "hi");
        assert_eq!(page[0].created_at, 42_000);
    }

    #[tokio::test]
    async fn test_send_message_from_unregistered_connection() {
        // given (precondition): sender never connected
        let presence = Arc::new(InMemoryPresenceStore::new());
        let conversations = Arc::new(InMemoryConversationStore::new());
        let usecase = usecase_with(
            presence,
            conversations.clone(),
            MockDeliveryChannel::new(),
        );

        // when (operation):
        let result = usecase
            .execute(
                &conn("c1"),
                Some(r#"{"recipientNickname":"bob","message":"hi"}"#),
            )
            .await;

        // then (expected result): fails, nothing appended, nobody notified
        assert!(matches!(result, Err(RelayError::UnknownConnection)));
        let (page, _) = conversations
            .query_recent(
                &ConversationId::between(&nick("alice"), &nick("bob")),
                i64::MAX,
                10,
                None,
            )
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_invalid_payload() {
        // given (precondition): alice is registered
        let presence = Arc::new(InMemoryPresenceStore::new());
        seed(&presence, "c1", "alice").await;
        let conversations = Arc::new(InMemoryConversationStore::new());
        let usecase = usecase_with(
            presence,
            conversations.clone(),
            MockDeliveryChannel::new(),
        );

        // when (operation): missing recipient, then empty body text
        let missing = usecase
            .execute(&conn("c1"), Some(r#"{"message":"hi"}"#))
            .await;
        let empty = usecase
            .execute(
                &conn("c1"),
                Some(r#"{"recipientNickname":"bob","message":""}"#),
            )
            .await;

        // then (expected result):
        for result in [missing, empty] {
            match result {
                Err(RelayError::InvalidPayload(msg)) => {
                    assert_eq!(msg, "invalid SendMessageBody")
                }
                other => panic!("expected InvalidPayload, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_send_message_to_offline_recipient_still_persists() {
        // given (precondition): only alice is online
        let presence = Arc::new(InMemoryPresenceStore::new());
        seed(&presence, "c1", "alice").await;
        let conversations = Arc::new(InMemoryConversationStore::new());
        // no expectations: nothing may be delivered
        let usecase = usecase_with(
            presence,
            conversations.clone(),
            MockDeliveryChannel::new(),
        );

        // when (operation):
        let result = usecase
            .execute(
                &conn("c1"),
                Some(r#"{"recipientNickname":"bob","message":"hi"}"#),
            )
            .await;

        // then (expected result): success, history written anyway
        assert!(result.is_ok());
        let (page, _) = conversations
            .query_recent(
                &ConversationId::between(&nick("alice"), &nick("bob")),
                i64::MAX,
                10,
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_stale_recipient_is_not_an_error() {
        // given (precondition): bob's presence exists but his transport
        // is gone; the channel reports stale
        let presence = Arc::new(InMemoryPresenceStore::new());
        seed(&presence, "c1", "alice").await;
        seed(&presence, "c2", "bob").await;
        let conversations = Arc::new(InMemoryConversationStore::new());

        let mut channel = MockDeliveryChannel::new();
        channel
            .expect_send()
            .times(1)
            .returning(|_, _| Ok(DeliveryOutcome::Stale));

        let usecase = usecase_with(presence, conversations, channel);

        // when (operation):
        let result = usecase
            .execute(
                &conn("c1"),
                Some(r#"{"recipientNickname":"bob","message":"hi"}"#),
            )
            .await;

        // then (expected result): fire-and-forget, still a success
        assert!(result.is_ok());
    }
}
