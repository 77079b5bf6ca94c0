//! Test helpers shared across LifeTracker crates.

pub mod context;
pub mod store;

pub use context::{memory_repository, memory_store, tool_context, tool_context_with};
pub use store::{CountingStore, FailingStore, StoreCalls};
