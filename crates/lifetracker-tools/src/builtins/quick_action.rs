//! Quick action tools.

use crate::builtins::utils::{
    listing, optional_text, parse_args, require_object, require_owner, require_text, to_value,
};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_store::{Condition, QuickAction};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default)]
pub struct CreateQuickActionTool;

#[derive(Debug, Deserialize)]
struct CreateQuickActionArgs {
    owner: String,
    category: String,
    label: String,
    #[serde(default)]
    action: Option<Value>,
}

#[async_trait]
impl Tool for CreateQuickActionTool {
    fn name(&self) -> &str {
        "create_quick_action"
    }

    fn description(&self) -> &str {
        "Create a one-tap quick action for the user"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "User id or email"},
                "category": {"type": "string", "description": "e.g. food, drink, exercise"},
                "label": {"type": "string", "description": "Button label"},
                "action": {"type": "object", "description": "Payload replayed when triggered"}
            },
            "required": ["owner", "category", "label"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: CreateQuickActionArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let category = require_text("category", &input.category)?;
        let label = require_text("label", &input.label)?;
        let action = require_object("action", input.action)?;
        let quick_action = ctx
            .repository()
            .quick_actions()
            .create(QuickAction::new(owner, category, label, action))
            .await?;
        info!("created quick action (id={})", quick_action.id);
        Ok(ToolResponse::success(to_value(&quick_action)?)
            .with_message("Quick action created successfully"))
    }
}

#[derive(Debug, Default)]
pub struct GetQuickActionsTool;

#[derive(Debug, Deserialize)]
struct GetQuickActionsArgs {
    owner: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl Tool for GetQuickActionsTool {
    fn name(&self) -> &str {
        "get_quick_actions"
    }

    fn description(&self) -> &str {
        "Fetch a user's quick actions, optionally by category"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "User id or email"},
                "category": {"type": "string"},
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 50}
            },
            "required": ["owner"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: GetQuickActionsArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let limit = ctx.resolve_limit(input.limit)?;
        let filters = optional_text(input.category)
            .map(|category| vec![Condition::equals("category", category)])
            .unwrap_or_default();
        let result = ctx
            .repository()
            .quick_actions()
            .list_by_owner(&owner, filters, limit)
            .await?;
        listing(&result.items, result.path)
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateQuickActionTool, GetQuickActionsTool};
    use crate::Tool;
    use crate::builtins::test_support::context;
    use lifetracker_protocol::ToolError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn quick_actions_list_by_category() {
        let ctx = context();
        for (category, label) in [("drink", "Coffee"), ("drink", "Water"), ("food", "Oats")] {
            CreateQuickActionTool
                .call(
                    &ctx,
                    json!({
                        "owner": "u1",
                        "category": category,
                        "label": label,
                        "action": {"activity_type": category, "raw_input": label}
                    }),
                )
                .await
                .expect("create");
        }
        let response = GetQuickActionsTool
            .call(&ctx, json!({"owner": "u1", "category": "drink", "limit": 10}))
            .await
            .expect("list");
        assert_eq!(response.count, Some(2));

        let limited = GetQuickActionsTool
            .call(&ctx, json!({"owner": "u1", "limit": 1}))
            .await
            .expect("list");
        assert_eq!(limited.count, Some(1));
    }

    #[tokio::test]
    async fn action_must_be_an_object() {
        let ctx = context();
        let err = CreateQuickActionTool
            .call(
                &ctx,
                json!({"owner": "u1", "category": "drink", "label": "Tea", "action": "brew"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
