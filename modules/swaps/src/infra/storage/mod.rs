pub mod memory;

pub use memory::{InMemoryConversationStore, InMemorySwapLedger};
