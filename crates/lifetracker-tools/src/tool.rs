//! The `Tool` trait implemented by every dispatchable LifeTracker operation.

use crate::context::ToolContext;
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use serde_json::Value;
use std::fmt::Debug;

/// What a client sees when it lists tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object; `owner` is always required.
    pub args_schema: Value,
}

/// A named operation over the entity tables.
///
/// Implementations parse their own arguments. Failures come back as
/// `ToolError` and are folded into the response envelope by the registry.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Dispatch key, unique within a registry.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args_schema(&self) -> Value;

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            args_schema: self.args_schema(),
        }
    }
}
