//! Adapters implementing the outbound ports.
//!
//! - `InMemoryStore`: session-lifetime key-value storage
//! - `FileStore`: one JSON file per key, device-lifetime storage
//! - `StackController`: in-memory host navigator publishing state changes

mod file_store;
mod memory_store;
mod stack_controller;

pub use file_store::FileStore;
pub use memory_store::InMemoryStore;
pub use stack_controller::{StackController, StateChanges, DEFAULT_CHANNEL_CAPACITY};
