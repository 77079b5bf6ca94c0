/// Errors returned by tools, resources and their dispatchers.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool name was not found in registry.
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    /// Resource URI did not match any registered template.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    /// Tool received arguments that do not match its schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Arguments parsed but a record failed domain validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The backing store rejected or failed the operation.
    #[error("storage error: {message}")]
    Storage { message: String, retryable: bool },
}

impl ToolError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ToolError::Storage {
                retryable: true,
                ..
            }
        )
    }
}
