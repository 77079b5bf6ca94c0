use lifetracker_config::{LifeTrackerConfig, StorageConfig};
use lifetracker_store::{InMemoryTableStore, Repository, TableResolver, TableStore};
use lifetracker_tools::{ToolContext, ToolServices};
use std::sync::Arc;

/// In-memory store with every entity table and the configured indexes.
pub fn memory_store(storage: &StorageConfig) -> InMemoryTableStore {
    InMemoryTableStore::for_entities(&TableResolver::from_config(storage), storage)
}

pub fn memory_repository(storage: &StorageConfig) -> Repository {
    Repository::new(Arc::new(memory_store(storage)), storage)
}

/// Tool context over a fresh in-memory store with default config.
pub fn tool_context() -> ToolContext {
    let config = LifeTrackerConfig::default();
    ToolContext::new(ToolServices {
        repository: memory_repository(&config.storage),
        limits: config.tools,
    })
}

/// Tool context over an arbitrary store.
pub fn tool_context_with(store: Arc<dyn TableStore>, config: &LifeTrackerConfig) -> ToolContext {
    ToolContext::new(ToolServices {
        repository: Repository::new(store, &config.storage),
        limits: config.tools.clone(),
    })
}
