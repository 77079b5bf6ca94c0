//! In-memory table store with DynamoDB-like paging and index semantics.

use crate::error::StoreError;
use crate::item::{AttributeValue, Condition, Item, Key, matches_all};
use crate::resolver::TableResolver;
use crate::schema::{
    ActivityLogSchema, EntitySchema, MemoryEntrySchema, OWNER_ATTRIBUTE, QuickActionSchema,
    UserProfileSchema,
};
use crate::store::{Page, PutRequest, QueryRequest, ScanRequest, TableStore, UpdateRequest};
use async_trait::async_trait;
use lifetracker_config::StorageConfig;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A single table: items ordered by primary key plus declared indexes.
#[derive(Debug, Clone)]
struct MemoryTable {
    key_attribute: String,
    /// Index name to the attribute it partitions on.
    indexes: HashMap<String, String>,
    items: BTreeMap<String, Item>,
}

/// Process-local table store.
///
/// Tables must be created before use; reads against unknown tables or indexes
/// fail the same way the managed store does. `Limit` counts items evaluated
/// before the filter is applied.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
}

impl InMemoryTableStore {
    /// Create an empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one table per entity, named through `resolver`, and the
    /// owner indexes declared in `storage`.
    pub fn for_entities(resolver: &TableResolver, storage: &StorageConfig) -> Self {
        let store = Self::new();
        store.create_entity_table::<ActivityLogSchema>(resolver, storage);
        store.create_entity_table::<UserProfileSchema>(resolver, storage);
        store.create_entity_table::<MemoryEntrySchema>(resolver, storage);
        store.create_entity_table::<QuickActionSchema>(resolver, storage);
        info!(
            "initialized in-memory table store (tables={})",
            store.tables.read().len()
        );
        store
    }

    fn create_entity_table<S: EntitySchema>(
        &self,
        resolver: &TableResolver,
        storage: &StorageConfig,
    ) {
        let table = resolver.resolve(S::NAME);
        self.create_table(&table, S::KEY_ATTRIBUTE);
        if let Some(index) = storage.index_for(S::NAME) {
            self.create_index(&table, &index.name, OWNER_ATTRIBUTE);
        }
    }

    /// Builder form of [`create_table`](Self::create_table).
    pub fn with_table(self, table: &str, key_attribute: &str) -> Self {
        self.create_table(table, key_attribute);
        self
    }

    /// Builder form of [`create_index`](Self::create_index).
    pub fn with_index(self, table: &str, index: &str, partition_attribute: &str) -> Self {
        self.create_index(table, index, partition_attribute);
        self
    }

    /// Create a table keyed by `key_attribute`; existing tables are kept.
    pub fn create_table(&self, table: &str, key_attribute: &str) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                key_attribute: key_attribute.to_string(),
                indexes: HashMap::new(),
                items: BTreeMap::new(),
            });
        debug!("created table (table={table}, key={key_attribute})");
    }

    /// Declare a secondary index on an existing table; unknown tables are ignored.
    pub fn create_index(&self, table: &str, index: &str, partition_attribute: &str) {
        if let Some(entry) = self.tables.write().get_mut(table) {
            entry
                .indexes
                .insert(index.to_string(), partition_attribute.to_string());
            debug!("created index (table={table}, index={index}, partition={partition_attribute})");
        }
    }

    /// Write an item as-is, bypassing every record check.
    pub fn insert_raw(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let entry = table_mut(&mut tables, table)?;
        let key = key_value(entry, table, &item)?;
        entry.items.insert(key, item);
        Ok(())
    }

    /// Number of items stored in `table`.
    pub fn item_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .get(table)
            .map_or(0, |entry| entry.items.len())
    }
}

fn table_mut<'a>(
    tables: &'a mut HashMap<String, MemoryTable>,
    table: &str,
) -> Result<&'a mut MemoryTable, StoreError> {
    tables.get_mut(table).ok_or_else(|| StoreError::TableNotFound {
        table: table.to_string(),
    })
}

fn table_ref<'a>(
    tables: &'a HashMap<String, MemoryTable>,
    table: &str,
) -> Result<&'a MemoryTable, StoreError> {
    tables.get(table).ok_or_else(|| StoreError::TableNotFound {
        table: table.to_string(),
    })
}

/// Primary key value of an item, which must be a string attribute.
fn key_value(entry: &MemoryTable, table: &str, item: &Item) -> Result<String, StoreError> {
    item.get(&entry.key_attribute)
        .and_then(AttributeValue::as_s)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Backend {
            table: table.to_string(),
            operation: "PutItem",
            message: format!("item is missing key attribute `{}`", entry.key_attribute),
        })
}

/// Evaluate candidates in key order after `start_key`, up to `limit` items.
fn read_page<'a>(
    entry: &MemoryTable,
    candidates: impl Iterator<Item = (&'a String, &'a Item)>,
    start_key: Option<&Item>,
    limit: Option<usize>,
    filter: &[Condition],
) -> Page {
    let start = start_key
        .and_then(|key| key.get(&entry.key_attribute))
        .and_then(AttributeValue::as_s);
    let mut remaining = candidates
        .filter(|(key, _)| start.is_none_or(|start| key.as_str() > start))
        .peekable();

    let mut items = Vec::new();
    let mut evaluated = 0usize;
    let mut last_evaluated_key = None;
    while let Some((key, item)) = remaining.next() {
        evaluated += 1;
        if matches_all(filter, item) {
            items.push(item.clone());
        }
        if limit.is_some_and(|limit| evaluated >= limit) {
            if remaining.peek().is_some() {
                let mut resume = Item::new();
                resume.insert(entry.key_attribute.clone(), AttributeValue::S(key.clone()));
                last_evaluated_key = Some(resume);
            }
            break;
        }
    }
    Page {
        items,
        last_evaluated_key,
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        _consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read();
        let entry = table_ref(&tables, table)?;
        if key.attribute != entry.key_attribute {
            return Err(StoreError::Backend {
                table: table.to_string(),
                operation: "GetItem",
                message: format!("`{}` is not the table key", key.attribute),
            });
        }
        Ok(entry.items.get(&key.value).cloned())
    }

    async fn put_item(&self, table: &str, request: PutRequest) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let entry = table_mut(&mut tables, table)?;
        let key = key_value(entry, table, &request.item)?;
        if request.require_absent.is_some() && entry.items.contains_key(&key) {
            return Err(StoreError::ConditionFailed {
                table: table.to_string(),
            });
        }
        entry.items.insert(key, request.item);
        Ok(())
    }

    async fn update_item(&self, table: &str, request: UpdateRequest) -> Result<Item, StoreError> {
        let mut tables = self.tables.write();
        let entry = table_mut(&mut tables, table)?;
        if request.key.attribute != entry.key_attribute
            || request.set.contains_key(&entry.key_attribute)
            || request.remove.contains(&entry.key_attribute)
        {
            return Err(StoreError::Backend {
                table: table.to_string(),
                operation: "UpdateItem",
                message: "the key attribute cannot be updated".to_string(),
            });
        }
        let key_attribute = entry.key_attribute.clone();
        let item = entry
            .items
            .entry(request.key.value.clone())
            .or_insert_with(|| {
                let mut item = Item::new();
                item.insert(key_attribute, AttributeValue::S(request.key.value.clone()));
                item
            });
        for attribute in &request.remove {
            item.remove(attribute);
        }
        for (attribute, value) in request.set {
            item.insert(attribute, value);
        }
        Ok(item.clone())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Page, StoreError> {
        let tables = self.tables.read();
        let entry = table_ref(&tables, table)?;
        let Some(partition_attribute) = entry.indexes.get(&request.index) else {
            return Err(StoreError::IndexNotFound {
                table: table.to_string(),
                index: request.index.clone(),
            });
        };
        if *partition_attribute != request.key.attribute {
            return Err(StoreError::Backend {
                table: table.to_string(),
                operation: "Query",
                message: format!(
                    "index {} is partitioned on `{partition_attribute}`, not `{}`",
                    request.index, request.key.attribute
                ),
            });
        }
        let partition = AttributeValue::S(request.key.value.clone());
        let candidates = entry
            .items
            .iter()
            .filter(|(_, item)| item.get(partition_attribute) == Some(&partition));
        Ok(read_page(
            entry,
            candidates,
            request.start_key.as_ref(),
            request.limit,
            &request.filter,
        ))
    }

    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Page, StoreError> {
        let tables = self.tables.read();
        let entry = table_ref(&tables, table)?;
        Ok(read_page(
            entry,
            entry.items.iter(),
            request.start_key.as_ref(),
            request.limit,
            &request.filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryTableStore;
    use crate::error::StoreError;
    use crate::item::{AttributeValue, Condition, Item, Key};
    use crate::store::{PutRequest, QueryRequest, ScanRequest, TableStore, UpdateRequest};
    use pretty_assertions::assert_eq;

    fn row(id: &str, owner: &str) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S(id.to_string()));
        item.insert("owner".to_string(), AttributeValue::S(owner.to_string()));
        item
    }

    fn store() -> InMemoryTableStore {
        InMemoryTableStore::new()
            .with_table("T", "id")
            .with_index("T", "byOwner", "owner")
    }

    #[tokio::test]
    async fn unknown_table_and_index_are_reported() {
        let store = store();
        let err = store
            .get_item("Missing", &Key::new("id", "x"), true)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::TableNotFound {
                table: "Missing".to_string()
            }
        );

        let request = QueryRequest {
            index: "byCategory".to_string(),
            key: Key::new("owner", "u1"),
            filter: Vec::new(),
            limit: None,
            consistent: false,
            start_key: None,
        };
        let err = store.query("T", &request).await.unwrap_err();
        assert!(matches!(err, StoreError::IndexNotFound { .. }));
    }

    #[tokio::test]
    async fn conditional_put_rejects_existing_key() {
        let store = store();
        store
            .put_item("T", PutRequest::create(row("a", "u1"), "id"))
            .await
            .expect("first put");
        let err = store
            .put_item("T", PutRequest::create(row("a", "u2"), "id"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed { .. }));
        store
            .put_item("T", PutRequest::overwrite(row("a", "u2")))
            .await
            .expect("overwrite");
        assert_eq!(store.item_count("T"), 1);
    }

    #[tokio::test]
    async fn scan_limit_counts_items_before_filtering() {
        let store = store();
        for (id, owner) in [("a", "u1"), ("b", "u2"), ("c", "u1"), ("d", "u2")] {
            store
                .put_item("T", PutRequest::overwrite(row(id, owner)))
                .await
                .expect("put");
        }
        let request = ScanRequest {
            filter: vec![Condition::equals("owner", "u1")],
            limit: Some(2),
            consistent: true,
            start_key: None,
        };
        let first = store.scan("T", &request).await.expect("scan");
        assert_eq!(first.items, vec![row("a", "u1")]);
        let resume = first.last_evaluated_key.expect("more pages");

        let second = store
            .scan(
                "T",
                &ScanRequest {
                    start_key: Some(resume),
                    ..request
                },
            )
            .await
            .expect("scan");
        assert_eq!(second.items, vec![row("c", "u1")]);
        assert_eq!(second.last_evaluated_key, None);
    }

    #[tokio::test]
    async fn update_creates_then_sets_and_removes() {
        let store = InMemoryTableStore::new().with_table("P", "owner");
        let mut set = Item::new();
        set.insert("email".to_string(), "a@example.com".into());
        set.insert("createdAt".to_string(), "first".into());
        let first = store
            .update_item(
                "P",
                UpdateRequest {
                    key: Key::new("owner", "u1"),
                    set,
                    remove: Vec::new(),
                },
            )
            .await
            .expect("update");
        assert_eq!(first.get("owner"), Some(&AttributeValue::from("u1")));
        assert_eq!(first.get("createdAt"), Some(&AttributeValue::from("first")));

        let mut set = Item::new();
        set.insert("weight".to_string(), AttributeValue::N("70".to_string()));
        let second = store
            .update_item(
                "P",
                UpdateRequest {
                    key: Key::new("owner", "u1"),
                    set,
                    remove: vec!["email".to_string()],
                },
            )
            .await
            .expect("update");
        assert_eq!(second.get("createdAt"), Some(&AttributeValue::from("first")));
        assert_eq!(second.get("weight"), Some(&AttributeValue::N("70".to_string())));
        assert_eq!(second.get("email"), None);
        assert_eq!(store.item_count("P"), 1);
    }
}
