//! Per-entity schema declarations consumed by the generic entity operations.

use crate::model::{ActivityLog, MemoryEntry, QuickAction, UserProfile};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Attribute every entity is listed by.
pub const OWNER_ATTRIBUTE: &str = "owner";

/// How a record's primary key is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// A fresh `<prefix>-<uuid>` identity is assigned on create.
    Generated { prefix: &'static str },
    /// The owner is the key; create overwrites.
    Owner,
}

/// Static description of one entity table.
pub trait EntitySchema: Send + Sync + 'static {
    type Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Logical table name, resolved to a physical table per deployment.
    const NAME: &'static str;
    const KEY_ATTRIBUTE: &'static str;
    const KEY_STRATEGY: KeyStrategy;
    /// Fields stored as one serialized text attribute.
    const NESTED_FIELDS: &'static [&'static str];

    fn key(record: &Self::Record) -> &str;
    fn owner(record: &Self::Record) -> &str;
    /// Return `record` carrying the assigned key.
    fn with_key(record: Self::Record, key: String) -> Self::Record;
}

pub struct ActivityLogSchema;

impl EntitySchema for ActivityLogSchema {
    type Record = ActivityLog;

    const NAME: &'static str = "ActivityLog";
    const KEY_ATTRIBUTE: &'static str = "id";
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::Generated { prefix: "activity" };
    const NESTED_FIELDS: &'static [&'static str] = &["processedData"];

    fn key(record: &ActivityLog) -> &str {
        &record.id
    }

    fn owner(record: &ActivityLog) -> &str {
        &record.owner
    }

    fn with_key(mut record: ActivityLog, key: String) -> ActivityLog {
        record.id = key;
        record
    }
}

pub struct UserProfileSchema;

impl EntitySchema for UserProfileSchema {
    type Record = UserProfile;

    const NAME: &'static str = "UserProfile";
    const KEY_ATTRIBUTE: &'static str = OWNER_ATTRIBUTE;
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::Owner;
    const NESTED_FIELDS: &'static [&'static str] = &["attributes"];

    fn key(record: &UserProfile) -> &str {
        &record.owner
    }

    fn owner(record: &UserProfile) -> &str {
        &record.owner
    }

    fn with_key(mut record: UserProfile, key: String) -> UserProfile {
        record.owner = key;
        record
    }
}

pub struct MemoryEntrySchema;

impl EntitySchema for MemoryEntrySchema {
    type Record = MemoryEntry;

    const NAME: &'static str = "MemoryEntry";
    const KEY_ATTRIBUTE: &'static str = "id";
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::Generated { prefix: "memory" };
    const NESTED_FIELDS: &'static [&'static str] = &["data"];

    fn key(record: &MemoryEntry) -> &str {
        &record.id
    }

    fn owner(record: &MemoryEntry) -> &str {
        &record.owner
    }

    fn with_key(mut record: MemoryEntry, key: String) -> MemoryEntry {
        record.id = key;
        record
    }
}

pub struct QuickActionSchema;

impl EntitySchema for QuickActionSchema {
    type Record = QuickAction;

    const NAME: &'static str = "QuickAction";
    const KEY_ATTRIBUTE: &'static str = "id";
    const KEY_STRATEGY: KeyStrategy = KeyStrategy::Generated {
        prefix: "quick-action",
    };
    const NESTED_FIELDS: &'static [&'static str] = &["action"];

    fn key(record: &QuickAction) -> &str {
        &record.id
    }

    fn owner(record: &QuickAction) -> &str {
        &record.owner
    }

    fn with_key(mut record: QuickAction, key: String) -> QuickAction {
        record.id = key;
        record
    }
}
