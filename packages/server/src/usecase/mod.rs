//! Usecase layer: the relay core.
//!
//! One usecase per operation, orchestrated by the `RelayDispatcher`.
//! Each inbound event is handled independently; the core owns no
//! durable state of its own.

mod broadcast;
mod connect;
mod disconnect;
mod dispatch;
mod error;
mod get_clients;
mod get_messages;
mod send_message;
mod session;

pub use broadcast::PresenceBroadcaster;
pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use dispatch::{operation, InboundEvent, RelayDispatcher, RouteStatus};
pub use error::RelayError;
pub use get_clients::GetClientsUseCase;
pub use get_messages::GetMessagesUseCase;
pub use send_message::SendMessageUseCase;
pub use session::SessionResolver;
