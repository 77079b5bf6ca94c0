//! Tool execution context and argument limits.

use lifetracker_config::ToolsConfig;
use lifetracker_protocol::ToolError;
use lifetracker_store::Repository;
use std::sync::Arc;

/// Shared service dependencies (constructed once at start-up, shared via Arc).
pub struct ToolServices {
    /// Entity access over the configured table store.
    pub repository: Repository,
    /// Limits applied to list arguments.
    pub limits: ToolsConfig,
}

/// Shared context passed to tools and resources during execution.
///
/// Cloning per call is a reference-count bump on the services.
#[derive(Clone)]
pub struct ToolContext {
    /// Tool or resource name for the current invocation.
    pub tool_name: Option<String>,
    pub services: Arc<ToolServices>,
}

impl ToolContext {
    pub fn new(services: ToolServices) -> Self {
        Self {
            tool_name: None,
            services: Arc::new(services),
        }
    }

    /// Context scoped to one named invocation.
    pub fn for_tool(&self, name: &str) -> Self {
        Self {
            tool_name: Some(name.to_string()),
            services: self.services.clone(),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.services.repository
    }

    pub fn limits(&self) -> &ToolsConfig {
        &self.services.limits
    }

    /// Resolve a requested list limit against the configured bounds.
    pub fn resolve_limit(&self, requested: Option<i64>) -> Result<usize, ToolError> {
        let limits = self.limits();
        let Some(requested) = requested else {
            return Ok(limits.default_limit);
        };
        usize::try_from(requested)
            .ok()
            .filter(|limit| (1..=limits.max_limit).contains(limit))
            .ok_or_else(|| {
                ToolError::Validation(format!(
                    "limit must be between 1 and {}, got {requested}",
                    limits.max_limit
                ))
            })
    }
}
