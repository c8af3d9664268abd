//! UseCase: presence snapshot reply.
//!
//! Replies to the requester only; no broadcast. The requester does not
//! need an established session.

use std::sync::Arc;

use crate::domain::{ConnectionId, DeliveryChannel, PresenceStore};
use crate::infrastructure::dto::websocket::OutboundPayload;

use super::RelayError;

pub struct GetClientsUseCase {
    presence: Arc<dyn PresenceStore>,
    channel: Arc<dyn DeliveryChannel>,
}

impl GetClientsUseCase {
    pub fn new(presence: Arc<dyn PresenceStore>, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { presence, channel }
    }

    pub async fn execute(&self, requester: &ConnectionId) -> Result<(), RelayError> {
        let snapshot = self.presence.list_all().await?;
        let payload = OutboundPayload::clients(&snapshot).to_json();
        // A stale requester resolves inside the channel; nothing to do.
        self.channel.send(requester, &payload).await?;
        Ok(())
    }
}
