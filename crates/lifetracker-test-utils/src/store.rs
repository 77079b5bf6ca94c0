use async_trait::async_trait;
use lifetracker_store::{
    Item, Key, Page, PutRequest, QueryRequest, ScanRequest, StoreError, TableStore, UpdateRequest,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Store whose every call fails with a throttling error.
#[derive(Clone, Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn new() -> Self {
        Self
    }

    fn throttled(table: &str, operation: &'static str) -> StoreError {
        StoreError::Throttled {
            table: table.to_string(),
            operation,
            message: "rate exceeded".to_string(),
        }
    }
}

#[async_trait]
impl TableStore for FailingStore {
    async fn get_item(
        &self,
        table: &str,
        _key: &Key,
        _consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        Err(Self::throttled(table, "GetItem"))
    }

    async fn put_item(&self, table: &str, _request: PutRequest) -> Result<(), StoreError> {
        Err(Self::throttled(table, "PutItem"))
    }

    async fn update_item(&self, table: &str, _request: UpdateRequest) -> Result<Item, StoreError> {
        Err(Self::throttled(table, "UpdateItem"))
    }

    async fn query(&self, table: &str, _request: &QueryRequest) -> Result<Page, StoreError> {
        Err(Self::throttled(table, "Query"))
    }

    async fn scan(&self, table: &str, _request: &ScanRequest) -> Result<Page, StoreError> {
        Err(Self::throttled(table, "Scan"))
    }
}

/// Per-operation call counts recorded by [`CountingStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub get_item: usize,
    pub put_item: usize,
    pub update_item: usize,
    pub query: usize,
    pub scan: usize,
    /// Whether every scan asked for a consistent read.
    pub scans_consistent: bool,
}

/// Wraps a store and counts the calls passing through.
#[derive(Clone)]
pub struct CountingStore<S> {
    inner: S,
    calls: Arc<Mutex<StoreCalls>>,
}

impl<S: TableStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(StoreCalls {
                scans_consistent: true,
                ..StoreCalls::default()
            })),
        }
    }

    pub fn calls(&self) -> StoreCalls {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl<S: TableStore> TableStore for CountingStore<S> {
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        self.calls.lock().get_item += 1;
        self.inner.get_item(table, key, consistent).await
    }

    async fn put_item(&self, table: &str, request: PutRequest) -> Result<(), StoreError> {
        self.calls.lock().put_item += 1;
        self.inner.put_item(table, request).await
    }

    async fn update_item(&self, table: &str, request: UpdateRequest) -> Result<Item, StoreError> {
        self.calls.lock().update_item += 1;
        self.inner.update_item(table, request).await
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Page, StoreError> {
        self.calls.lock().query += 1;
        self.inner.query(table, request).await
    }

    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Page, StoreError> {
        {
            let mut calls = self.calls.lock();
            calls.scan += 1;
            calls.scans_consistent &= request.consistent;
        }
        self.inner.scan(table, request).await
    }
}
