//! Configuration schema for LifeTracker.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Region used when neither the config file nor the environment sets one.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Root config for the LifeTracker tool layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LifeTrackerConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl LifeTrackerConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> LifeTrackerConfigBuilder {
        LifeTrackerConfigBuilder::new()
    }
}

/// Builder for assembling a `LifeTrackerConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct LifeTrackerConfigBuilder {
    config: LifeTrackerConfig,
}

impl LifeTrackerConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: LifeTrackerConfig::default(),
        }
    }

    /// Replace the storage configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Replace the tool limits configuration.
    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.config.tools = tools;
        self
    }

    /// Set the deployment table prefix.
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.storage.table_prefix = Some(prefix.into());
        self
    }

    /// Declare an owner index for an entity table.
    pub fn index(mut self, entity: impl Into<String>, index: IndexConfig) -> Self {
        self.config.storage.indexes.insert(entity.into(), index);
        self
    }

    /// Finalize and return the built `LifeTrackerConfig`.
    pub fn build(self) -> LifeTrackerConfig {
        self.config
    }
}

/// Backing store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Deployment suffix appended to every logical table name.
    #[serde(default)]
    pub table_prefix: Option<String>,
    /// Override for the store endpoint (local DynamoDB and similar).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Static credentials; when absent the default provider chain is used.
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    /// Owner indexes keyed by logical entity name.
    #[serde(default)]
    pub indexes: HashMap<String, IndexConfig>,
    /// Items evaluated per store page during list calls.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            table_prefix: None,
            endpoint_url: None,
            credentials: None,
            indexes: HashMap::new(),
            page_size: default_page_size(),
        }
    }
}

impl StorageConfig {
    /// Effective table prefix; blank values count as unset.
    pub fn table_prefix(&self) -> Option<&str> {
        self.table_prefix
            .as_deref()
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
    }

    /// Owner index declared for a logical entity, if any.
    pub fn index_for(&self, entity: &str) -> Option<&IndexConfig> {
        self.indexes.get(entity)
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_page_size() -> usize {
    100
}

/// Static access credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Global secondary index partitioned on the owner attribute.
///
/// Tables are partitioned on their own key, so an owner index can only be
/// global, and global indexes are eventually consistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    pub name: String,
}

impl IndexConfig {
    pub fn global(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Limits applied to tool arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolsConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            recent_activity_limit: default_recent_activity_limit(),
        }
    }
}

fn default_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    100
}

fn default_recent_activity_limit() -> usize {
    20
}
