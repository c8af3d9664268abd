//! UI layer: the axum transport terminating WebSocket connections and
//! translating frames into relay events.

pub mod handler;
mod server;
mod signal;
mod state;

pub use server::Server;
pub use state::AppState;
