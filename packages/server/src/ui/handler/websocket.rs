//! WebSocket connection handler.
//!
//! Terminates the transport: assigns a connection identity, registers
//! the outbound channel, and translates socket frames into inbound
//! relay events. All relay semantics live behind the dispatcher.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::ActionProbe;
use crate::usecase::{operation, InboundEvent, RouteStatus};

use super::super::state::AppState;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub nickname: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Reject at the transport level before upgrading; a rejected
    // connect never produces a pushed payload.
    let nickname = match query.nickname {
        Some(n) if !n.trim().is_empty() => n,
        _ => {
            tracing::warn!("Connect attempt without a nickname rejected");
            return Err(StatusCode::FORBIDDEN);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, nickname)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, nickname: String) {
    // The transport assigns the connection identity.
    let connection_id = ConnectionId::new(Uuid::new_v4().to_string())
        .expect("uuid is never empty");

    let (tx, rx) = mpsc::unbounded_channel();
    state.channel.register(connection_id.clone(), tx).await;

    let status = state
        .dispatcher
        .dispatch(InboundEvent {
            connection_id: connection_id.clone(),
            operation: operation::CONNECT.to_string(),
            payload: Some(nickname.clone()),
        })
        .await;
    if status != RouteStatus::Forbidden {
        tracing::info!(
            "Connection '{}' established as '{}'",
            connection_id.as_str(),
            nickname
        );
    } else {
        state.channel.unregister(&connection_id).await;
        return;
    }

    let (sender, mut receiver) = socket.split();
    let mut send_task = pump_outbound(rx, sender);

    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_frame(&recv_state, &recv_connection_id, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!(
                        "Connection '{}' requested close",
                        recv_connection_id.as_str()
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // If either task completes, tear down the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Transport is gone; deregister the channel, then let the relay
    // observe the disconnect.
    state.channel.unregister(&connection_id).await;
    state
        .dispatcher
        .dispatch(InboundEvent {
            connection_id: connection_id.clone(),
            operation: operation::DISCONNECT.to_string(),
            payload: None,
        })
        .await;
    tracing::info!("Connection '{}' closed", connection_id.as_str());
}

/// Map one text frame's `action` to a dispatchable operation.
///
/// Lifecycle operations are reserved for the transport layer: `connect`
/// only ever originates from the upgrade path and `disconnect` from the
/// close path in `handle_socket`. A frame naming either is treated like
/// any other unrecognized action.
fn frame_operation(text: &str) -> Option<String> {
    let action = serde_json::from_str::<ActionProbe>(text).ok()?.action?;
    match action.as_str() {
        operation::CONNECT | operation::DISCONNECT => None,
        _ => Some(action),
    }
}

/// Parse the `action` discriminator out of one text frame and hand the
/// raw payload to the dispatcher. Frames without a dispatchable action
/// are dropped with a log; the connection itself stays up.
async fn dispatch_frame(state: &Arc<AppState>, connection_id: &ConnectionId, text: &str) {
    let Some(action) = frame_operation(text) else {
        tracing::warn!(
            "Frame without a dispatchable action from '{}' rejected",
            connection_id.as_str()
        );
        return;
    };

    let status = state
        .dispatcher
        .dispatch(InboundEvent {
            connection_id: connection_id.clone(),
            operation: action.clone(),
            payload: Some(text.to_string()),
        })
        .await;

    if status == RouteStatus::Forbidden {
        tracing::warn!(
            "Operation '{}' from '{}' rejected",
            action,
            connection_id.as_str()
        );
    }
}

/// Pump payloads from the per-connection channel into the socket.
fn pump_outbound(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}
