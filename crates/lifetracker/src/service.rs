//! Wiring of configuration, table store and registries into one service.

use anyhow::Context;
use lifetracker_config::LifeTrackerConfig;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_store::{InMemoryTableStore, Repository, TableResolver, TableStore};
use lifetracker_tools::{
    ResourceRegistry, ToolContext, ToolRegistry, ToolServices, builtin_resource_registry,
    builtin_tool_registry,
};
use log::{info, warn};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Table store implementation selected at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Process-local tables, lost on exit.
    Memory,
    /// DynamoDB through the AWS SDK (requires the `dynamodb` feature).
    #[value(name = "dynamodb")]
    DynamoDb,
}

impl Backend {
    /// DynamoDB when compiled in, memory otherwise.
    pub fn default_for_build() -> Self {
        if cfg!(feature = "dynamodb") {
            Backend::DynamoDb
        } else {
            Backend::Memory
        }
    }

    /// Whether records outlive the process.
    pub fn is_persistent(self) -> bool {
        matches!(self, Backend::DynamoDb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::DynamoDb => "dynamodb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool and resource registries bound to one repository.
#[derive(Clone)]
pub struct Service {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    context: ToolContext,
}

impl Service {
    /// Build a service over an existing store with the built-in catalogue.
    pub fn new(config: &LifeTrackerConfig, store: Arc<dyn TableStore>) -> Self {
        let context = ToolContext::new(ToolServices {
            repository: Repository::new(store, &config.storage),
            limits: config.tools.clone(),
        });
        Self {
            tools: builtin_tool_registry(),
            resources: builtin_resource_registry(),
            context,
        }
    }

    /// Open the selected backend and build the service on top of it.
    pub async fn connect(config: &LifeTrackerConfig, backend: Backend) -> anyhow::Result<Self> {
        let store = open_store(config, backend)
            .await
            .with_context(|| format!("failed to open {backend} backend"))?;
        info!(
            "opened table store (backend={backend}, region={}, prefix={})",
            config.storage.region,
            config.storage.table_prefix().unwrap_or("-")
        );
        if !backend.is_persistent() {
            warn!("serving from process-local tables; all records are lost on exit");
        }
        Ok(Self::new(config, store))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    pub fn repository(&self) -> &Repository {
        self.context.repository()
    }

    /// Run one tool; failures come back as a failure envelope.
    pub async fn call_tool(&self, name: &str, args: Value) -> ToolResponse {
        self.tools.dispatch(&self.context, name, args).await
    }

    /// Read one resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ToolResponse, ToolError> {
        self.resources.read(&self.context, uri).await
    }
}

async fn open_store(
    config: &LifeTrackerConfig,
    backend: Backend,
) -> anyhow::Result<Arc<dyn TableStore>> {
    match backend {
        Backend::Memory => {
            let resolver = TableResolver::from_config(&config.storage);
            Ok(Arc::new(InMemoryTableStore::for_entities(
                &resolver,
                &config.storage,
            )))
        }
        Backend::DynamoDb => open_dynamodb(config).await,
    }
}

#[cfg(feature = "dynamodb")]
async fn open_dynamodb(config: &LifeTrackerConfig) -> anyhow::Result<Arc<dyn TableStore>> {
    let store = lifetracker_store::DynamoDbTableStore::from_config(&config.storage).await;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "dynamodb"))]
async fn open_dynamodb(_config: &LifeTrackerConfig) -> anyhow::Result<Arc<dyn TableStore>> {
    anyhow::bail!("this build does not include DynamoDB support; rebuild with --features dynamodb")
}
