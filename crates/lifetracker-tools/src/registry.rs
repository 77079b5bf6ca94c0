//! Name-keyed tool dispatch.

use crate::context::ToolContext;
use crate::tool::{Tool, ToolSpec};
use lifetracker_protocol::{ToolError, ToolResponse};
use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Tools by name. Clones share the same map.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tool`, replacing any earlier tool with the same name.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        debug!("registering tool (name={})", tool.name());
        self.tools.write().insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Sorted tool names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Specs ordered by name, so listings are stable.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.read().values().map(|tool| tool.spec()).collect();
        specs.sort_by(|left, right| left.name.cmp(&right.name));
        specs
    }

    /// Invoke a tool by name.
    ///
    /// Never fails: unknown tools and tool errors become failure envelopes.
    pub async fn dispatch(&self, ctx: &ToolContext, name: &str, args: Value) -> ToolResponse {
        let Some(tool) = self.get(name) else {
            warn!("unknown tool requested (name={name})");
            return ToolResponse::failure(&ToolError::ToolNotFound(name.to_string()));
        };
        let ctx = ctx.for_tool(name);
        match tool.call(&ctx, args).await {
            Ok(response) => {
                debug!("tool call succeeded (name={name})");
                response
            }
            Err(err) => {
                warn!(
                    "tool call failed (name={name}, retryable={}): {err}",
                    err.is_retryable()
                );
                ToolResponse::failure(&err)
            }
        }
    }
}
