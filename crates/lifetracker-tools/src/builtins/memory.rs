//! Memory entry tools (saved foods, routines and other reusable items).

use crate::builtins::utils::{listing, optional_text, parse_args, require_owner, require_text, to_value};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_store::{Condition, MemoryEntry};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default)]
pub struct CreateMemoryEntryTool;

#[derive(Debug, Deserialize)]
struct CreateMemoryEntryArgs {
    owner: String,
    entry_type: String,
    name: String,
    data: Value,
}

#[async_trait]
impl Tool for CreateMemoryEntryTool {
    fn name(&self) -> &str {
        "create_memory_entry"
    }

    fn description(&self) -> &str {
        "Save a reusable memory entry such as a favourite food or exercise"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "User id or email"},
                "entry_type": {"type": "string", "description": "e.g. food, exercise, custom"},
                "name": {"type": "string", "description": "Display name of the entry"},
                "data": {"description": "Structured payload saved with the entry"}
            },
            "required": ["owner", "entry_type", "name", "data"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: CreateMemoryEntryArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let entry_type = require_text("entry_type", &input.entry_type)?;
        let name = require_text("name", &input.name)?;
        let entry = ctx
            .repository()
            .memory_entries()
            .create(MemoryEntry::new(owner, entry_type, name, input.data))
            .await?;
        info!("created memory entry (id={})", entry.id);
        Ok(ToolResponse::success(to_value(&entry)?).with_message("Memory entry created successfully"))
    }
}

#[derive(Debug, Default)]
pub struct GetMemoryEntriesTool;

#[derive(Debug, Deserialize)]
struct GetMemoryEntriesArgs {
    owner: String,
    #[serde(default)]
    entry_type: Option<String>,
    #[serde(default)]
    name_contains: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl Tool for GetMemoryEntriesTool {
    fn name(&self) -> &str {
        "get_memory_entries"
    }

    fn description(&self) -> &str {
        "Fetch a user's memory entries, optionally by type or name fragment"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "User id or email"},
                "entry_type": {"type": "string"},
                "name_contains": {
                    "type": "string",
                    "description": "Case-sensitive substring of the entry name"
                },
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 50}
            },
            "required": ["owner"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: GetMemoryEntriesArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let limit = ctx.resolve_limit(input.limit)?;
        let mut filters = Vec::new();
        if let Some(entry_type) = optional_text(input.entry_type) {
            filters.push(Condition::equals("entryType", entry_type));
        }
        if let Some(fragment) = optional_text(input.name_contains) {
            filters.push(Condition::contains("name", fragment));
        }
        let result = ctx
            .repository()
            .memory_entries()
            .list_by_owner(&owner, filters, limit)
            .await?;
        listing(&result.items, result.path)
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateMemoryEntryTool, GetMemoryEntriesTool};
    use crate::Tool;
    use crate::builtins::test_support::context;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn entries_filter_by_type_and_name() {
        let ctx = context();
        for (entry_type, name) in [
            ("food", "Overnight oats"),
            ("food", "Protein oats"),
            ("exercise", "Morning run"),
        ] {
            CreateMemoryEntryTool
                .call(
                    &ctx,
                    json!({
                        "owner": "u1",
                        "entry_type": entry_type,
                        "name": name,
                        "data": {"tags": ["saved"], "name": name}
                    }),
                )
                .await
                .expect("create");
        }

        let response = GetMemoryEntriesTool
            .call(
                &ctx,
                json!({"owner": "u1", "entry_type": "food", "name_contains": "Protein"}),
            )
            .await
            .expect("list");
        assert_eq!(response.count, Some(1));
        let data = response.data.expect("data");
        assert_eq!(data[0]["name"], json!("Protein oats"));
        assert_eq!(data[0]["data"], json!({"tags": ["saved"], "name": "Protein oats"}));

        let all = GetMemoryEntriesTool
            .call(&ctx, json!({"owner": "u1", "entry_type": " "}))
            .await
            .expect("list");
        assert_eq!(all.count, Some(3));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let ctx = context();
        let err = CreateMemoryEntryTool
            .call(
                &ctx,
                json!({"owner": "u1", "entry_type": "food", "name": " ", "data": {}}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "validation failed: name must not be empty");
    }
}
