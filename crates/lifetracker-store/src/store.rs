//! Table store abstraction over the managed key-value store.

use crate::error::StoreError;
use crate::item::{Condition, Item, Key};
use async_trait::async_trait;

/// Write a whole item, optionally only when its key is not taken yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub item: Item,
    /// Key attribute that must be absent for the put to apply.
    pub require_absent: Option<String>,
}

impl PutRequest {
    /// Unconditional put; overwrites an existing item with the same key.
    pub fn overwrite(item: Item) -> Self {
        Self {
            item,
            require_absent: None,
        }
    }

    /// Put that fails with `ConditionFailed` when `key_attribute` already exists.
    pub fn create(item: Item, key_attribute: impl Into<String>) -> Self {
        Self {
            item,
            require_absent: Some(key_attribute.into()),
        }
    }
}

/// Set attributes on a single item, creating it when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub key: Key,
    /// Attributes overwritten unconditionally.
    pub set: Item,
    /// Attributes removed from the item.
    pub remove: Vec<String>,
}

/// Query a secondary index by its partition key.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub index: String,
    pub key: Key,
    pub filter: Vec<Condition>,
    /// Maximum items evaluated (before filtering) in this page.
    pub limit: Option<usize>,
    pub consistent: bool,
    pub start_key: Option<Item>,
}

/// Scan a whole table with a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub filter: Vec<Condition>,
    /// Maximum items evaluated (before filtering) in this page.
    pub limit: Option<usize>,
    pub consistent: bool,
    pub start_key: Option<Item>,
}

/// One page of query or scan results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Resume point; `None` once the table or partition is exhausted.
    pub last_evaluated_key: Option<Item>,
}

/// Managed key-value store used by entity operations.
///
/// Implementations report a missing index as [`StoreError::IndexNotFound`] so
/// callers can choose another read path.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Point read by primary key.
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistent: bool,
    ) -> Result<Option<Item>, StoreError>;

    /// Write a whole item.
    async fn put_item(&self, table: &str, request: PutRequest) -> Result<(), StoreError>;

    /// Update attributes of one item and return the item as stored afterwards.
    async fn update_item(&self, table: &str, request: UpdateRequest) -> Result<Item, StoreError>;

    /// Read one page from a secondary index.
    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Page, StoreError>;

    /// Read one page from a full-table scan.
    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Page, StoreError>;
}
