//! In-memory store implementations.
//!
//! HashMaps behind a `Mutex` stand in for the durable stores; every
//! trait method locks, mutates one record, and unlocks, which preserves
//! the per-record atomicity the relay core relies on.

mod conversation;
mod presence;

pub use conversation::InMemoryConversationStore;
pub use presence::InMemoryPresenceStore;
