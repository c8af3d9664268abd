//! Presence and direct-message relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin banter-server
//! cargo run --bin banter-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use banter_server::{
    infrastructure::{
        delivery::WebSocketDeliveryChannel,
        repository::{InMemoryConversationStore, InMemoryPresenceStore},
    },
    ui::{AppState, Server},
    usecase::{
        ConnectUseCase, DisconnectUseCase, GetClientsUseCase, GetMessagesUseCase,
        PresenceBroadcaster, RelayDispatcher, SendMessageUseCase,
    },
};
use banter_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "banter-server")]
#[command(about = "Presence and direct-message relay over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Wire dependencies in order:
    // 1. Stores
    // 2. Delivery channel
    // 3. UseCases and dispatcher
    // 4. AppState and server
    let presence = Arc::new(InMemoryPresenceStore::new());
    let conversations = Arc::new(InMemoryConversationStore::new());
    let channel = Arc::new(WebSocketDeliveryChannel::new(presence.clone()));
    let clock = Arc::new(SystemClock);

    let broadcaster = Arc::new(PresenceBroadcaster::new(
        presence.clone(),
        channel.clone(),
    ));
    let dispatcher = Arc::new(RelayDispatcher::new(
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
        channel.clone(),
    ));

    let state = Arc::new(AppState {
        dispatcher,
        channel,
    });

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
