//! End-to-end tool and resource calls through the assembled service.

use lifetracker::config::{ConfigLoadOptions, IndexConfig, LifeTrackerConfig};
use lifetracker::{Backend, Service};
use lifetracker_test_utils::{CountingStore, FailingStore, memory_store};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_service(config: &LifeTrackerConfig) -> Service {
    Service::new(config, Arc::new(memory_store(&config.storage)))
}

#[tokio::test]
async fn throttled_store_yields_retryable_failure() {
    let config = LifeTrackerConfig::default();
    let service = Service::new(&config, Arc::new(FailingStore::new()));

    let response = service
        .call_tool("get_activity_logs", json!({"owner": "u1"}))
        .await;
    let value = response.to_value();
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["retryable"], json!(true));

    let created = service
        .call_tool(
            "create_activity_log",
            json!({"owner": "u1", "activity_type": "drink", "raw_input": "coffee"}),
        )
        .await;
    assert!(!created.success);
    assert_eq!(created.retryable, Some(true));
}

#[tokio::test]
async fn owner_listing_without_index_uses_consistent_scan() {
    let config = LifeTrackerConfig::default();
    let store = CountingStore::new(memory_store(&config.storage));
    let service = Service::new(&config, Arc::new(store.clone()));

    service
        .call_tool(
            "create_activity_log",
            json!({"owner": "u1", "activity_type": "sleep", "raw_input": "8h"}),
        )
        .await;
    let listed = service
        .call_tool("get_activity_logs", json!({"owner": "u1"}))
        .await;
    assert_eq!(listed.count, Some(1));
    assert_eq!(listed.to_value()["readPath"], json!("scan"));

    let calls = store.calls();
    assert_eq!(calls.query, 0);
    assert!(calls.scan >= 1);
    assert!(calls.scans_consistent);
}

#[tokio::test]
async fn declared_index_is_queried() {
    let config = LifeTrackerConfig::builder()
        .index("MemoryEntry", IndexConfig::global("memoryEntriesByOwner"))
        .build();
    let store = CountingStore::new(memory_store(&config.storage));
    let service = Service::new(&config, Arc::new(store.clone()));

    service
        .call_tool(
            "create_memory_entry",
            json!({"owner": "u1", "entry_type": "food", "name": "Oats", "data": {"kcal": 350}}),
        )
        .await;
    let listed = service
        .call_tool("get_memory_entries", json!({"owner": "u1"}))
        .await;
    assert_eq!(listed.count, Some(1));
    assert_eq!(listed.to_value()["readPath"], json!("index"));
    assert_eq!(store.calls().scan, 0);
}

#[tokio::test]
async fn unknown_tool_is_a_failure_envelope() {
    let service = memory_service(&LifeTrackerConfig::default());
    let response = service.call_tool("delete_everything", json!({})).await;
    assert_eq!(
        response.to_value(),
        json!({"success": false, "error": "tool not found: delete_everything"})
    );
}

#[tokio::test]
async fn resources_resolve_by_uri() {
    let service = memory_service(&LifeTrackerConfig::default());
    service
        .call_tool(
            "update_user_profile",
            json!({"owner": "user@example.com", "weight": 70.0}),
        )
        .await;
    let profile = service
        .read_resource("profile://user@example.com")
        .await
        .expect("profile");
    assert_eq!(profile.data.expect("data")["weight"], json!(70.0));

    let recent = service
        .read_resource("recent-activities://user@example.com")
        .await
        .expect("recent");
    assert_eq!(recent.count, Some(0));

    assert!(service.read_resource("weather://user@example.com").await.is_err());
    assert!(service.read_resource("profile://").await.is_err());
}

#[tokio::test]
async fn config_file_drives_prefix_and_limits() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("lifetracker.json5");
    fs::write(
        &path,
        r#"{
            storage: { table_prefix: "abc123-dev" },
            tools: { default_limit: 2, max_limit: 5, recent_activity_limit: 3 },
        }"#,
    )
    .expect("write config");
    let config = LifeTrackerConfig::load(ConfigLoadOptions {
        ignore_env: true,
        ..ConfigLoadOptions::with_path(&path)
    })
    .expect("config");
    let service = Service::connect(&config, Backend::Memory)
        .await
        .expect("service");

    for raw_input in ["water", "tea", "juice"] {
        let created = service
            .call_tool(
                "create_activity_log",
                json!({"owner": "u1", "activity_type": "drink", "raw_input": raw_input}),
            )
            .await;
        assert!(created.success);
    }
    let listed = service
        .call_tool("get_activity_logs", json!({"owner": "u1"}))
        .await;
    assert_eq!(listed.count, Some(2));

    let rejected = service
        .call_tool("get_activity_logs", json!({"owner": "u1", "limit": 6}))
        .await;
    assert!(!rejected.success);

    let table = service.repository().resolver().resolve("ActivityLog");
    assert_eq!(table, "ActivityLog-abc123-dev");
}
