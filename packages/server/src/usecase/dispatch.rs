//! Inbound event dispatch.
//!
//! Maps an inbound event to its operation handler and applies the
//! failure policy: expected failures on payload-bearing operations are
//! pushed back to the requester as an `error`-typed payload, lifecycle
//! failures stay silent, and everything is swallowed before it can
//! reach the transport layer.

use std::sync::Arc;

use crate::domain::{ConnectionId, DeliveryChannel};
use crate::infrastructure::dto::websocket::OutboundPayload;

use super::{
    ConnectUseCase, DisconnectUseCase, GetClientsUseCase, GetMessagesUseCase, RelayError,
    SendMessageUseCase,
};

/// Recognized operation names on the wire.
pub mod operation {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const GET_CLIENTS: &str = "getClients";
    pub const SEND_MESSAGE: &str = "sendMessage";
    pub const GET_MESSAGES: &str = "getMessages";
}

/// One inbound event from the transport: who, what, and with which
/// payload.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub connection_id: ConnectionId,
    pub operation: String,
    pub payload: Option<String>,
}

/// Transport-level outcome of handling an event. This is the only
/// thing the transport layer ever sees; logical failures have already
/// been communicated (or deliberately not) via pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    Accepted,
    Forbidden,
}

pub struct RelayDispatcher {
    connect: Arc<ConnectUseCase>,
    disconnect: Arc<DisconnectUseCase>,
    get_clients: Arc<GetClientsUseCase>,
    send_message: Arc<SendMessageUseCase>,
    get_messages: Arc<GetMessagesUseCase>,
    channel: Arc<dyn DeliveryChannel>,
}

impl RelayDispatcher {
    pub fn new(
        connect: Arc<ConnectUseCase>,
        disconnect: Arc<DisconnectUseCase>,
        get_clients: Arc<GetClientsUseCase>,
        send_message: Arc<SendMessageUseCase>,
        get_messages: Arc<GetMessagesUseCase>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            connect,
            disconnect,
            get_clients,
            send_message,
            get_messages,
            channel,
        }
    }

    pub async fn dispatch(&self, event: InboundEvent) -> RouteStatus {
        tracing::debug!(
            "Dispatching '{}' for connection '{}'",
            event.operation,
            event.connection_id.as_str()
        );

        match event.operation.as_str() {
            operation::CONNECT => {
                match self
                    .connect
                    .execute(event.connection_id.clone(), event.payload)
                    .await
                {
                    Ok(()) => RouteStatus::Accepted,
                    Err(RelayError::RejectedConnect) => RouteStatus::Forbidden,
                    // Lifecycle failures are silent toward the client.
                    Err(e) => {
                        tracing::error!(
                            "connect failed for '{}': {}",
                            event.connection_id.as_str(),
                            e
                        );
                        RouteStatus::Accepted
                    }
                }
            }
            operation::DISCONNECT => {
                if let Err(e) = self.disconnect.execute(&event.connection_id).await {
                    tracing::error!(
                        "disconnect failed for '{}': {}",
                        event.connection_id.as_str(),
                        e
                    );
                }
                RouteStatus::Accepted
            }
            operation::GET_CLIENTS => {
                let result = self.get_clients.execute(&event.connection_id).await;
                self.finish(&event.connection_id, result).await
            }
            operation::SEND_MESSAGE => {
                let result = self
                    .send_message
                    .execute(&event.connection_id, event.payload.as_deref())
                    .await;
                self.finish(&event.connection_id, result).await
            }
            operation::GET_MESSAGES => {
                let result = self
                    .get_messages
                    .execute(&event.connection_id, event.payload.as_deref())
                    .await;
                self.finish(&event.connection_id, result).await
            }
            unknown => {
                tracing::warn!(
                    "Unknown operation '{}' from connection '{}'",
                    unknown,
                    event.connection_id.as_str()
                );
                RouteStatus::Forbidden
            }
        }
    }

    /// Failure policy for non-lifecycle operations: `UnknownConnection`
    /// and `InvalidPayload` become an `error` push to the requester;
    /// store and delivery failures are logged. Either way the event
    /// counts as handled.
    async fn finish(
        &self,
        requester: &ConnectionId,
        result: Result<(), RelayError>,
    ) -> RouteStatus {
        if let Err(err) = result {
            match &err {
                RelayError::UnknownConnection | RelayError::InvalidPayload(_) => {
                    let payload = OutboundPayload::error(&err.to_string()).to_json();
                    if let Err(e) = self.channel.send(requester, &payload).await {
                        tracing::warn!(
                            "Failed to push error to '{}': {}",
                            requester.as_str(),
                            e
                        );
                    }
                }
                _ => tracing::error!(
                    "Operation failed for '{}': {}",
                    requester.as_str(),
                    err
                ),
            }
        }
        RouteStatus::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryOutcome, MockDeliveryChannel, PresenceStore};
    use crate::infrastructure::repository::{InMemoryConversationStore, InMemoryPresenceStore};
    use crate::usecase::PresenceBroadcaster;
    use banter_shared::time::FixedClock;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn event(id: &str, op: &str, payload: Option<&str>) -> InboundEvent {
        InboundEvent {
            connection_id: conn(id),
            operation: op.to_string(),
            payload: payload.map(str::to_string),
        }
    }

    struct Harness {
        presence: Arc<InMemoryPresenceStore>,
        dispatcher: RelayDispatcher,
    }

    fn harness(channel: MockDeliveryChannel) -> Harness {
        let presence = Arc::new(InMemoryPresenceStore::new());
        let conversations = Arc::new(InMemoryConversationStore::new());
        let channel: Arc<dyn DeliveryChannel> = Arc::new(channel);
        let clock = Arc::new(FixedClock::new(1000));
        let broadcaster = Arc::new(PresenceBroadcaster::new(
            presence.clone(),
            channel.clone(),
        ));

        let dispatcher = RelayDispatcher::new(
            Arc::new(ConnectUseCase::new(
                presence.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            Arc::new(DisconnectUseCase::new(presence.clone(), broadcaster)),
            Arc::new(GetClientsUseCase::new(presence.clone(), channel.clone())),
            Arc::new(SendMessageUseCase::new(
                presence.clone(),
                conversations.clone(),
                channel.clone(),
                clock.clone(),
            )),
            Arc::new(GetMessagesUseCase::new(
                presence.clone(),
                conversations,
                channel.clone(),
                clock,
            )),
            channel,
        );

        Harness {
            presence,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_is_forbidden() {
        // given (precondition):
        let h = harness(MockDeliveryChannel::new()); // nothing may be pushed

        // when (operation):
        let status = h.dispatcher.dispatch(event("c1", "fly", None)).await;

        // then (expected result):
        assert_eq!(status, RouteStatus::Forbidden);
    }

    #[tokio::test]
    async fn test_connect_without_nickname_is_forbidden_and_silent() {
        // given (precondition):
        let h = harness(MockDeliveryChannel::new()); // no error push allowed

        // when (operation):
        let status = h
            .dispatcher
            .dispatch(event("c1", operation::CONNECT, None))
            .await;

        // then (expected result): transport-level reject only
        assert_eq!(status, RouteStatus::Forbidden);
        assert_eq!(h.presence.get(&conn("c1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_then_disconnect_roundtrip() {
        // given (precondition):
        let h = harness(MockDeliveryChannel::new());

        // when (operation):
        let connected = h
            .dispatcher
            .dispatch(event("c1", operation::CONNECT, Some("alice")))
            .await;
        assert_eq!(connected, RouteStatus::Accepted);
        assert!(h.presence.get(&conn("c1")).await.unwrap().is_some());

        let disconnected = h
            .dispatcher
            .dispatch(event("c1", operation::DISCONNECT, None))
            .await;

        // then (expected result): presence gone, both accepted
        assert_eq!(disconnected, RouteStatus::Accepted);
        assert_eq!(h.presence.get(&conn("c1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_message_from_stranger_pushes_error() {
        // given (precondition): requester never connected
        let mut channel = MockDeliveryChannel::new();
        channel
            .expect_send()
            .withf(|id, payload| {
                id.as_str() == "c1"
                    && payload == r#"{"type":"error","message":"client does not exist"}"#
            })
            .times(1)
            .returning(|_, _| Ok(DeliveryOutcome::Delivered));
        let h = harness(channel);

        // when (operation):
        let status = h
            .dispatcher
            .dispatch(event(
                "c1",
                operation::SEND_MESSAGE,
                Some(r#"{"recipientNickname":"bob","message":"hi"}"#),
            ))
            .await;

        // then (expected result): error pushed, event still accepted
        assert_eq!(status, RouteStatus::Accepted);
    }

    #[tokio::test]
    async fn test_invalid_send_message_payload_pushes_error() {
        // given (precondition): alice is connected; her connect causes
        // no broadcast (nobody else online)
        let mut channel = MockDeliveryChannel::new();
        channel
            .expect_send()
            .withf(|id, payload| {
                id.as_str() == "c1"
                    && payload == r#"{"type":"error","message":"invalid SendMessageBody"}"#
            })
            .times(1)
            .returning(|_, _| Ok(DeliveryOutcome::Delivered));
        let h = harness(channel);
        h.dispatcher
            .dispatch(event("c1", operation::CONNECT, Some("alice")))
            .await;

        // when (operation): payload missing the message field
        let status = h
            .dispatcher
            .dispatch(event(
                "c1",
                operation::SEND_MESSAGE,
                Some(r#"{"recipientNickname":"bob"}"#),
            ))
            .await;

        // then (expected result):
        assert_eq!(status, RouteStatus::Accepted);
    }

    #[tokio::test]
    async fn test_get_clients_works_without_session() {
        // given (precondition): requester is not registered; snapshot
        // still goes back to them
        let mut channel = MockDeliveryChannel::new();
        channel
            .expect_send()
            .withf(|id, payload| {
                id.as_str() == "c1" && payload == r#"{"type":"clients","value":[]}"#
            })
            .times(1)
            .returning(|_, _| Ok(DeliveryOutcome::Delivered));
        let h = harness(channel);

        // when (operation):
        let status = h
            .dispatcher
            .dispatch(event("c1", operation::GET_CLIENTS, None))
            .await;

        // then (expected result):
        assert_eq!(status, RouteStatus::Accepted);
    }
}
