//! Generic CRUD surface shared by every entity schema.

use crate::codec::RecordCodec;
use crate::error::EntityError;
use crate::item::{Condition, Item, Key};
use crate::model::{ProfilePatch, UserProfile, timestamp};
use crate::resolver::TableResolver;
use crate::router::{OwnerQuery, QueryRouter, ReadPath};
use crate::schema::{
    ActivityLogSchema, EntitySchema, KeyStrategy, MemoryEntrySchema, QuickActionSchema,
    UserProfileSchema,
};
use crate::store::{PutRequest, TableStore, UpdateRequest};
use lifetracker_config::{IndexConfig, StorageConfig};
use log::info;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Longest accepted owner identifier, in characters.
pub const MAX_OWNER_LEN: usize = 256;

/// Reject blank or oversized owners.
pub fn validate_owner(owner: &str) -> Result<(), EntityError> {
    if owner.trim().is_empty() {
        return Err(EntityError::Validation("owner must not be empty".to_string()));
    }
    if owner.chars().count() > MAX_OWNER_LEN {
        return Err(EntityError::Validation(format!(
            "owner must be at most {MAX_OWNER_LEN} characters"
        )));
    }
    Ok(())
}

/// Decoded owner listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityListing<R> {
    pub items: Vec<R>,
    pub path: ReadPath,
}

/// Result of a create-or-update.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert<R> {
    pub record: R,
    /// True when no record existed before.
    pub created: bool,
}

/// Store handle plus the read-only storage settings every operation needs.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TableStore>,
    resolver: TableResolver,
    router: QueryRouter,
    indexes: HashMap<String, IndexConfig>,
}

impl Repository {
    pub fn new(store: Arc<dyn TableStore>, storage: &StorageConfig) -> Self {
        Self {
            store,
            resolver: TableResolver::from_config(storage),
            router: QueryRouter::from_config(storage),
            indexes: storage.indexes.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    pub fn resolver(&self) -> &TableResolver {
        &self.resolver
    }

    pub fn entity<S: EntitySchema>(&self) -> EntityOps<'_, S> {
        EntityOps {
            repository: self,
            _schema: PhantomData,
        }
    }

    pub fn activity_logs(&self) -> EntityOps<'_, ActivityLogSchema> {
        self.entity()
    }

    pub fn profiles(&self) -> EntityOps<'_, UserProfileSchema> {
        self.entity()
    }

    pub fn memory_entries(&self) -> EntityOps<'_, MemoryEntrySchema> {
        self.entity()
    }

    pub fn quick_actions(&self) -> EntityOps<'_, QuickActionSchema> {
        self.entity()
    }
}

/// Operations on the table described by `S`.
pub struct EntityOps<'a, S: EntitySchema> {
    repository: &'a Repository,
    _schema: PhantomData<S>,
}

impl<S: EntitySchema> EntityOps<'_, S> {
    /// Physical table, resolved per call.
    pub fn table(&self) -> String {
        self.repository.resolver.resolve(S::NAME)
    }

    fn store(&self) -> &dyn TableStore {
        self.repository.store.as_ref()
    }

    /// Persist a new record.
    ///
    /// Generated-key entities get a fresh identity and a write conditional on
    /// the key being unused. Owner-keyed entities overwrite.
    pub async fn create(&self, record: S::Record) -> Result<S::Record, EntityError> {
        validate_owner(S::owner(&record))?;
        let table = self.table();
        let (record, request) = match S::KEY_STRATEGY {
            KeyStrategy::Generated { prefix } => {
                let record = S::with_key(record, format!("{prefix}-{}", Uuid::new_v4()));
                let item = RecordCodec::encode::<S>(&record)?;
                (record, PutRequest::create(item, S::KEY_ATTRIBUTE))
            }
            KeyStrategy::Owner => {
                let item = RecordCodec::encode::<S>(&record)?;
                (record, PutRequest::overwrite(item))
            }
        };
        self.store().put_item(&table, request).await?;
        info!(
            "created record (table={table}, key={})",
            S::key(&record)
        );
        Ok(record)
    }

    /// Strongly consistent point lookup.
    pub async fn get(&self, key: &str) -> Result<Option<S::Record>, EntityError> {
        let table = self.table();
        let item = self
            .store()
            .get_item(&table, &Key::new(S::KEY_ATTRIBUTE, key), true)
            .await?;
        item.map(RecordCodec::decode::<S>)
            .transpose()
            .map_err(EntityError::from)
    }

    /// Records owned by `owner` matching `filters`, at most `limit`.
    pub async fn list_by_owner(
        &self,
        owner: &str,
        filters: Vec<Condition>,
        limit: usize,
    ) -> Result<EntityListing<S::Record>, EntityError> {
        validate_owner(owner)?;
        let table = self.table();
        let query = OwnerQuery {
            owner: owner.to_string(),
            filters,
            limit,
        };
        let listing = self
            .repository
            .router
            .list_by_owner(
                self.store(),
                &table,
                self.repository.indexes.get(S::NAME),
                &query,
            )
            .await?;
        let items = listing
            .items
            .into_iter()
            .map(RecordCodec::decode::<S>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EntityListing {
            items,
            path: listing.path,
        })
    }

    /// Read the current record, apply `apply`, and write the result back.
    ///
    /// Existing records are updated in place; absent ones are put. The result
    /// must keep the same key.
    pub async fn upsert_with<F>(&self, key: &str, apply: F) -> Result<Upsert<S::Record>, EntityError>
    where
        F: FnOnce(Option<S::Record>) -> Result<S::Record, EntityError>,
    {
        let table = self.table();
        let key = Key::new(S::KEY_ATTRIBUTE, key);
        let current = self.store().get_item(&table, &key, true).await?;
        let existing = current
            .clone()
            .map(RecordCodec::decode::<S>)
            .transpose()?;
        let created = existing.is_none();
        let record = apply(existing)?;
        if S::key(&record) != key.value {
            return Err(EntityError::Validation(format!(
                "{} cannot change from `{}`",
                S::KEY_ATTRIBUTE,
                key.value
            )));
        }
        validate_owner(S::owner(&record))?;
        let item = RecordCodec::encode::<S>(&record)?;

        let record = match current {
            Some(current) => {
                let request = update_request::<S>(key, current, item);
                let stored = self.store().update_item(&table, request).await?;
                RecordCodec::decode::<S>(stored)?
            }
            None => {
                self.store()
                    .put_item(&table, PutRequest::overwrite(item))
                    .await?;
                record
            }
        };
        info!(
            "upserted record (table={table}, key={}, created={created})",
            S::key(&record)
        );
        Ok(Upsert { record, created })
    }
}

/// Turn the old and new item into a set/remove update.
fn update_request<S: EntitySchema>(key: Key, current: Item, mut next: Item) -> UpdateRequest {
    next.remove(S::KEY_ATTRIBUTE);
    let remove = current
        .into_keys()
        .filter(|attribute| attribute != S::KEY_ATTRIBUTE && !next.contains_key(attribute))
        .collect();
    UpdateRequest {
        key,
        set: next,
        remove,
    }
}

impl EntityOps<'_, UserProfileSchema> {
    /// Merge `patch` into the owner's profile, creating it when absent.
    pub async fn update(
        &self,
        owner: &str,
        patch: &ProfilePatch,
    ) -> Result<Upsert<UserProfile>, EntityError> {
        validate_owner(owner)?;
        patch.validate().map_err(EntityError::Validation)?;
        self.upsert_with(owner, |current| {
            let profile = current.unwrap_or_else(|| UserProfile::new(owner));
            Ok(patch.apply(profile, timestamp::now()))
        })
        .await
    }

    /// Replace the owner's profile fields with `patch`, keeping `created_at`.
    pub async fn replace(
        &self,
        owner: &str,
        patch: &ProfilePatch,
    ) -> Result<Upsert<UserProfile>, EntityError> {
        validate_owner(owner)?;
        patch.validate().map_err(EntityError::Validation)?;
        self.upsert_with(owner, |current| {
            let mut profile = UserProfile::new(owner);
            if let Some(current) = current {
                profile.created_at = current.created_at;
            }
            Ok(patch.apply(profile, timestamp::now()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_OWNER_LEN, Repository, validate_owner};
    use crate::error::EntityError;
    use crate::memory::InMemoryTableStore;
    use crate::model::{ActivityLog, ActivityType, ProfilePatch};
    use crate::resolver::TableResolver;
    use crate::router::ReadPath;
    use lifetracker_config::StorageConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn repository() -> Repository {
        let storage = StorageConfig::default();
        let store = InMemoryTableStore::for_entities(&TableResolver::from_config(&storage), &storage);
        Repository::new(Arc::new(store), &storage)
    }

    #[test]
    fn owner_validation_bounds() {
        assert!(validate_owner("u1").is_ok());
        assert!(matches!(validate_owner("  "), Err(EntityError::Validation(_))));
        assert!(validate_owner(&"x".repeat(MAX_OWNER_LEN)).is_ok());
        assert!(validate_owner(&"x".repeat(MAX_OWNER_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn create_assigns_prefixed_identity() {
        let repository = repository();
        let log = repository
            .activity_logs()
            .create(ActivityLog::new("u1", ActivityType::Sleep, "slept 8h", None, None))
            .await
            .expect("create");
        assert!(log.id.starts_with("activity-"));
        let stored = repository
            .activity_logs()
            .get(&log.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored, log);
    }

    #[tokio::test]
    async fn list_by_owner_uses_scan_without_index() {
        let repository = repository();
        for owner in ["u1", "u2", "u1"] {
            repository
                .activity_logs()
                .create(ActivityLog::new(owner, ActivityType::Food, "toast", None, None))
                .await
                .expect("create");
        }
        let listing = repository
            .activity_logs()
            .list_by_owner("u1", Vec::new(), 50)
            .await
            .expect("list");
        assert_eq!(listing.path, ReadPath::Scan);
        assert_eq!(listing.items.len(), 2);
        assert!(listing.items.iter().all(|log| log.owner == "u1"));
    }

    #[tokio::test]
    async fn profile_update_merges_and_replace_resets() {
        let repository = repository();
        let profiles = repository.profiles();
        let first: ProfilePatch = serde_json::from_value(json!({
            "email": "a@example.com",
            "attributes": {"theme": "dark"}
        }))
        .expect("patch");
        let created = profiles.update("u1", &first).await.expect("update");
        assert!(created.created);

        let second: ProfilePatch = serde_json::from_value(json!({
            "height": 180.0,
            "attributes": {"units": "metric"}
        }))
        .expect("patch");
        let merged = profiles.update("u1", &second).await.expect("update");
        assert!(!merged.created);
        assert_eq!(merged.record.email.as_deref(), Some("a@example.com"));
        assert_eq!(merged.record.attributes.len(), 2);
        assert_eq!(merged.record.created_at, created.record.created_at);

        let replaced = profiles.replace("u1", &second).await.expect("replace");
        assert_eq!(replaced.record.email, None);
        assert_eq!(replaced.record.attributes.len(), 1);
        assert_eq!(replaced.record.created_at, created.record.created_at);
        assert_eq!(profiles.get("u1").await.expect("get"), Some(replaced.record));
    }
}
