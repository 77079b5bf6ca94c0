//! Entity operation integration tests over the in-memory store.

use futures_util::future::join_all;
use lifetracker_config::{IndexConfig, LifeTrackerConfig, StorageConfig};
use lifetracker_store::{
    ActivityLog, ActivityType, AttributeValue, Condition, EntityError, InMemoryTableStore,
    MemoryEntry, ProfilePatch, QuickAction, ReadPath, Repository, TableResolver, TableStore,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn repository_for(storage: &StorageConfig) -> (Repository, InMemoryTableStore) {
    let store = InMemoryTableStore::for_entities(&TableResolver::from_config(storage), storage);
    (
        Repository::new(Arc::new(store.clone()), storage),
        store,
    )
}

/// A food log written with nested data lists back with the same payload.
#[tokio::test]
async fn food_log_round_trips_through_listing() {
    let config = LifeTrackerConfig::builder().table_prefix("abc-staging").build();
    let (repository, store) = repository_for(&config.storage);
    let processed = json!({
        "description": "1 cup of Greek yogurt with honey",
        "estimated_portion_size": "1 cup",
        "macro_nutrients": {"protein": 20.0, "carbs": 25.5},
        "micro_nutrients": {"calcium": "250mg"},
        "glycemic_load": 8
    });
    let created = repository
        .activity_logs()
        .create(ActivityLog::new(
            "user@example.com",
            ActivityType::Food,
            "yogurt and honey",
            Some(processed.clone()),
            None,
        ))
        .await
        .expect("create");
    assert_eq!(store.item_count("ActivityLog-abc-staging"), 1);

    let listing = repository
        .activity_logs()
        .list_by_owner(
            "user@example.com",
            vec![Condition::equals("activityType", "food")],
            50,
        )
        .await
        .expect("list");
    assert_eq!(listing.items, vec![created]);
    assert_eq!(listing.items[0].processed_data, Some(processed));
}

/// Concurrent creates never share an identity.
#[tokio::test]
async fn concurrent_creates_get_unique_ids() {
    let storage = StorageConfig::default();
    let (repository, store) = repository_for(&storage);
    let creates = (0..64).map(|index| {
        let repository = repository.clone();
        async move {
            repository
                .memory_entries()
                .create(MemoryEntry::new(
                    "u1",
                    "food",
                    format!("meal {index}"),
                    json!({"index": index}),
                ))
                .await
        }
    });
    let created = join_all(creates).await;
    let ids: HashSet<String> = created
        .into_iter()
        .map(|entry| entry.expect("create").id)
        .collect();
    assert_eq!(ids.len(), 64);
    assert!(ids.iter().all(|id| id.starts_with("memory-")));
    assert_eq!(store.item_count("MemoryEntry"), 64);
}

/// Repeating the same profile upsert leaves one identical record.
#[tokio::test]
async fn profile_upsert_is_idempotent() {
    let storage = StorageConfig::default();
    let (repository, store) = repository_for(&storage);
    let patch: ProfilePatch = serde_json::from_value(json!({
        "email": "u1@example.com",
        "weight": 70.5,
        "attributes": {"units": "metric"}
    }))
    .expect("patch");
    let first = repository.profiles().update("u1", &patch).await.expect("first");
    let second = repository.profiles().update("u1", &patch).await.expect("second");

    assert_eq!(store.item_count("UserProfile"), 1);
    assert_eq!(first.record.email, second.record.email);
    assert_eq!(first.record.weight, second.record.weight);
    assert_eq!(first.record.attributes, second.record.attributes);
    assert_eq!(first.record.created_at, second.record.created_at);
}

#[tokio::test]
async fn unknown_owner_lists_nothing() {
    let storage = StorageConfig::default();
    let (repository, _) = repository_for(&storage);
    repository
        .quick_actions()
        .create(QuickAction::new("u1", "drink", "Coffee", None))
        .await
        .expect("create");
    let listing = repository
        .quick_actions()
        .list_by_owner("someone-else", Vec::new(), 50)
        .await
        .expect("list");
    assert!(listing.items.is_empty());
}

/// A declared index that the table lacks is served by a scan.
#[tokio::test]
async fn declared_but_missing_index_falls_back() {
    let config = LifeTrackerConfig::builder()
        .index("QuickAction", IndexConfig::global("byOwner"))
        .build();
    let store = InMemoryTableStore::new().with_table("QuickAction", "id");
    let repository = Repository::new(Arc::new(store), &config.storage);
    repository
        .quick_actions()
        .create(QuickAction::new("u1", "food", "Oats", Some(json!({"grams": 60}))))
        .await
        .expect("create");
    let listing = repository
        .quick_actions()
        .list_by_owner("u1", Vec::new(), 10)
        .await
        .expect("list");
    assert_eq!(listing.path, ReadPath::Scan);
    assert_eq!(listing.items.len(), 1);
}

#[tokio::test]
async fn declared_index_serves_listing() {
    let config = LifeTrackerConfig::builder()
        .index("MemoryEntry", IndexConfig::global("byOwner"))
        .build();
    let (repository, _) = repository_for(&config.storage);
    repository
        .memory_entries()
        .create(MemoryEntry::new("u1", "custom", "Water bottle", json!({"ml": 750})))
        .await
        .expect("create");
    let listing = repository
        .memory_entries()
        .list_by_owner("u1", vec![Condition::contains("name", "bottle")], 10)
        .await
        .expect("list");
    assert_eq!(listing.path, ReadPath::Index);
    assert_eq!(listing.items.len(), 1);
}

/// Hand-corrupted nested data surfaces as a codec failure, not a silent drop.
#[tokio::test]
async fn corrupted_nested_data_fails_listing() {
    let storage = StorageConfig::default();
    let (repository, store) = repository_for(&storage);
    let mut item = lifetracker_store::Item::new();
    for (name, value) in [
        ("id", "memory-bad"),
        ("owner", "u1"),
        ("entryType", "food"),
        ("name", "Broken"),
        ("data", "{\"unterminated\": "),
        ("createdAt", "2025-01-01T00:00:00.000Z"),
        ("updatedAt", "2025-01-01T00:00:00.000Z"),
    ] {
        item.insert(name.to_string(), AttributeValue::from(value));
    }
    store.insert_raw("MemoryEntry", item).expect("insert");
    let err = repository
        .memory_entries()
        .list_by_owner("u1", Vec::new(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::Codec(_)));
    assert!(
        store
            .get_item("MemoryEntry", &lifetracker_store::Key::new("id", "memory-bad"), true)
            .await
            .expect("get")
            .is_some()
    );
}
