//! Error types for store, codec and entity operations.

use lifetracker_protocol::ToolError;

/// Errors returned by table stores.
///
/// Every variant names the physical table; none carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The physical table does not exist.
    #[error("table not found: {table}")]
    TableNotFound { table: String },
    /// The named secondary index does not exist on the table.
    #[error("index {index} not found on table {table}")]
    IndexNotFound { table: String, index: String },
    /// A conditional write found an existing item.
    #[error("conditional write rejected on table {table}")]
    ConditionFailed { table: String },
    /// Request rate exceeded.
    #[error("{operation} on {table} throttled: {message}")]
    Throttled {
        table: String,
        operation: &'static str,
        message: String,
    },
    /// The caller is not allowed to perform the operation.
    #[error("{operation} on {table} denied: {message}")]
    AccessDenied {
        table: String,
        operation: &'static str,
        message: String,
    },
    /// The store could not be reached.
    #[error("{operation} on {table} failed to reach the store: {message}")]
    Connectivity {
        table: String,
        operation: &'static str,
        message: String,
    },
    /// Any other backend failure.
    #[error("{operation} on {table} failed: {message}")]
    Backend {
        table: String,
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    /// Whether the same request may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Throttled { .. } | StoreError::Connectivity { .. }
        )
    }
}

/// Errors raised while converting between records and items.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Records must serialize to a JSON object.
    #[error("record did not serialize to an object")]
    NotAnObject,
    /// A structured value appeared in a field not declared as nested.
    #[error("field `{field}` holds structured data but is not a nested field")]
    UnexpectedStructure { field: String },
    /// A nested attribute did not hold valid serialized JSON.
    #[error("field `{field}` does not hold valid serialized data: {reason}")]
    InvalidNested { field: String, reason: String },
    /// The decoded attributes did not form a valid record.
    #[error("failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors returned by entity operations.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Stored data could not be converted.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Input rejected before reaching the store.
    #[error("{0}")]
    Validation(String),
}

impl EntityError {
    /// Whether the same request may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            EntityError::Store(err) => err.is_retryable(),
            EntityError::Codec(_) | EntityError::Validation(_) => false,
        }
    }
}

impl From<EntityError> for ToolError {
    fn from(err: EntityError) -> Self {
        match err {
            EntityError::Store(err) => ToolError::Storage {
                retryable: err.is_retryable(),
                message: err.to_string(),
            },
            EntityError::Codec(err) => ToolError::Validation(err.to_string()),
            EntityError::Validation(message) => ToolError::Validation(message),
        }
    }
}
