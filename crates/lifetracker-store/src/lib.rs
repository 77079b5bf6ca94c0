//! Storage access for the LifeTracker entity tables.
//!
//! Layers, leaf first: [`TableResolver`] maps logical entity names to physical
//! tables, [`TableStore`] is the seam to the managed key-value store,
//! [`QueryRouter`] picks between an owner index and a consistent scan,
//! [`RecordCodec`] flattens records into items, and [`EntityOps`] composes the
//! lot into one CRUD surface per [`EntitySchema`].

pub mod codec;
#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod entity;
pub mod error;
pub mod item;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod store;

/// Record <-> item conversion.
pub use codec::RecordCodec;
/// DynamoDB-backed table store.
#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbTableStore;
/// Generic entity operations and the repository that hands them out.
pub use entity::{EntityListing, EntityOps, MAX_OWNER_LEN, Repository, Upsert, validate_owner};
/// Error types for each layer.
pub use error::{CodecError, EntityError, StoreError};
/// Storage item model.
pub use item::{AttributeValue, Condition, Item, Key};
/// In-memory table store used for tests and local runs.
pub use memory::InMemoryTableStore;
/// Entity record models.
pub use model::{
    ActivityLog, ActivityType, ExerciseIntensity, ExerciseProcessedData, FoodProcessedData,
    MemoryEntry, ProfilePatch, QuickAction, UserProfile, timestamp,
};
/// Logical -> physical table resolution.
pub use resolver::TableResolver;
/// Read-path selection.
pub use router::{ConsistentScan, IndexedQuery, Listing, OwnerQuery, QueryRouter, ReadPath, ReadStrategy};
/// Entity schemas.
pub use schema::{
    ActivityLogSchema, EntitySchema, KeyStrategy, MemoryEntrySchema, QuickActionSchema,
    UserProfileSchema, OWNER_ATTRIBUTE,
};
/// Table store abstraction.
pub use store::{Page, PutRequest, QueryRequest, ScanRequest, TableStore, UpdateRequest};
