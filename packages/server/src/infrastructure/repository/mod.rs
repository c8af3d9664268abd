pub mod inmemory;

pub use inmemory::{InMemoryConversationStore, InMemoryPresenceStore};
