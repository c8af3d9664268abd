//! UseCase: paginated history retrieval for one conversation.

use std::sync::Arc;

use banter_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConversationId, ConversationStore, DeliveryChannel, Nickname, PresenceStore,
};
use crate::infrastructure::dto::websocket::{GetMessagesBody, OutboundPayload};

use super::{RelayError, SessionResolver};

pub struct GetMessagesUseCase {
    resolver: SessionResolver,
    conversations: Arc<dyn ConversationStore>,
    channel: Arc<dyn DeliveryChannel>,
    clock: Arc<dyn Clock>,
}

impl GetMessagesUseCase {
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        conversations: Arc<dyn ConversationStore>,
        channel: Arc<dyn DeliveryChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: SessionResolver::new(presence),
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
        let requester = self.resolver.resolve(connection_id).await?;

        let body = parse_body(payload)?;
        let target = Nickname::new(body.target_nickname)
            .map_err(|_| RelayError::InvalidPayload("invalid GetMessageBody".to_string()))?;

        let conversation_id = ConversationId::between(&requester.nickname, &target);
        let (records, token) = self
            .conversations
            .query_recent(
                &conversation_id,
                self.clock.now_millis(),
                body.limit as usize,
                body.last_evaluated_key,
            )
            .await?;

        let reply = OutboundPayload::messages(records, token).to_json();
        self.channel.send(connection_id, &reply).await?;
        Ok(())
    }
}

fn parse_body(payload: Option<&str>) -> Result<GetMessagesBody, RelayError> {
    let invalid = || RelayError::InvalidPayload("invalid GetMessageBody".to_string());
    let body: GetMessagesBody =
        serde_json::from_str(payload.unwrap_or("{}")).map_err(|_| invalid())?;
    if body.limit <= 0 {
        return Err(invalid());
    }
    Ok(body)
}
