//! Logical entity name to physical table name resolution.

use lifetracker_config::StorageConfig;
use log::debug;

/// Maps logical entity names to deployment-specific table names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableResolver {
    prefix: Option<String>,
}

impl TableResolver {
    /// Resolver with an optional deployment prefix; blank prefixes are ignored.
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string);
        Self { prefix }
    }

    /// Resolver using the configured table prefix.
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.table_prefix())
    }

    /// The active prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Physical table name for `entity`: `<entity>-<prefix>` or `<entity>`.
    pub fn resolve(&self, entity: &str) -> String {
        let table = match &self.prefix {
            Some(prefix) => format!("{entity}-{prefix}"),
            None => entity.to_string(),
        };
        debug!("resolved table (entity={entity}, table={table})");
        table
    }
}
