//! Owner listings over either an owner index or a consistent table scan.

use crate::error::StoreError;
use crate::item::{Condition, Item, Key};
use crate::schema::OWNER_ATTRIBUTE;
use crate::store::{Page, QueryRequest, ScanRequest, TableStore};
use async_trait::async_trait;
use lifetracker_config::{IndexConfig, StorageConfig};
use log::{debug, warn};
use std::fmt;

/// Which read path served a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPath {
    Index,
    Scan,
}

impl ReadPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPath::Index => "index",
            ReadPath::Scan => "scan",
        }
    }
}

impl fmt::Display for ReadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing request: every item owned by `owner` that passes `filters`.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerQuery {
    pub owner: String,
    pub filters: Vec<Condition>,
    /// Maximum matches returned.
    pub limit: usize,
}

impl OwnerQuery {
    pub fn new(owner: impl Into<String>, limit: usize) -> Self {
        Self {
            owner: owner.into(),
            filters: Vec::new(),
            limit,
        }
    }

    pub fn with_filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }
}

/// One way of reading owner pages from a table.
#[async_trait]
pub trait ReadStrategy: Send + Sync {
    fn path(&self) -> ReadPath;

    /// Read one page of at most `page_size` evaluated items.
    async fn fetch(
        &self,
        store: &dyn TableStore,
        table: &str,
        query: &OwnerQuery,
        start_key: Option<Item>,
        page_size: usize,
    ) -> Result<Page, StoreError>;
}

/// Query an owner index with key condition `owner = :owner`.
///
/// Owner indexes are global secondary indexes, which DynamoDB only reads
/// eventually consistently. A record written moments ago may be missing from
/// this path; only [`ConsistentScan`] gives read-after-write freshness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedQuery {
    pub index: String,
}

impl IndexedQuery {
    pub fn from_config(index: &IndexConfig) -> Self {
        Self {
            index: index.name.clone(),
        }
    }
}

#[async_trait]
impl ReadStrategy for IndexedQuery {
    fn path(&self) -> ReadPath {
        ReadPath::Index
    }

    async fn fetch(
        &self,
        store: &dyn TableStore,
        table: &str,
        query: &OwnerQuery,
        start_key: Option<Item>,
        page_size: usize,
    ) -> Result<Page, StoreError> {
        let request = QueryRequest {
            index: self.index.clone(),
            key: Key::new(OWNER_ATTRIBUTE, query.owner.clone()),
            filter: query.filters.clone(),
            limit: Some(page_size),
            consistent: false,
            start_key,
        };
        store.query(table, &request).await
    }
}

/// Strongly consistent scan filtered on `owner = :owner`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsistentScan;

#[async_trait]
impl ReadStrategy for ConsistentScan {
    fn path(&self) -> ReadPath {
        ReadPath::Scan
    }

    async fn fetch(
        &self,
        store: &dyn TableStore,
        table: &str,
        query: &OwnerQuery,
        start_key: Option<Item>,
        page_size: usize,
    ) -> Result<Page, StoreError> {
        let mut filter = Vec::with_capacity(query.filters.len() + 1);
        filter.push(Condition::equals(OWNER_ATTRIBUTE, query.owner.clone()));
        filter.extend(query.filters.iter().cloned());
        let request = ScanRequest {
            filter,
            limit: Some(page_size),
            consistent: true,
            start_key,
        };
        store.scan(table, &request).await
    }
}

/// Raw listing result, in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub items: Vec<Item>,
    pub path: ReadPath,
    /// Store pages read to fill the listing.
    pub pages: usize,
}

/// Chooses the read path for owner listings and pages until the limit is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRouter {
    page_size: usize,
}

impl QueryRouter {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// List items owned by `query.owner`.
    ///
    /// Uses `index` when one is declared and falls back to a consistent scan
    /// when the store reports the index missing. Other errors propagate.
    pub async fn list_by_owner(
        &self,
        store: &dyn TableStore,
        table: &str,
        index: Option<&IndexConfig>,
        query: &OwnerQuery,
    ) -> Result<Listing, StoreError> {
        if let Some(index) = index {
            let strategy = IndexedQuery::from_config(index);
            match self.collect(&strategy, store, table, query).await {
                Err(StoreError::IndexNotFound { table, index }) => {
                    warn!("index {index} missing on {table}; falling back to consistent scan");
                }
                result => return result,
            }
        }
        self.collect(&ConsistentScan, store, table, query).await
    }

    /// Read pages with `strategy` until `query.limit` matches or the end.
    pub async fn collect(
        &self,
        strategy: &dyn ReadStrategy,
        store: &dyn TableStore,
        table: &str,
        query: &OwnerQuery,
    ) -> Result<Listing, StoreError> {
        let mut items = Vec::new();
        let mut pages = 0usize;
        let mut start_key = None;
        while items.len() < query.limit {
            let page = strategy
                .fetch(store, table, query, start_key.take(), self.page_size)
                .await?;
            pages += 1;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }
        items.truncate(query.limit);
        debug!(
            "listed owner items (table={table}, path={}, items={}, pages={pages})",
            strategy.path(),
            items.len()
        );
        Ok(Listing {
            items,
            path: strategy.path(),
            pages,
        })
    }
}
