//! User profile tools.

use crate::builtins::utils::{parse_args, require_owner, to_value};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_store::{ProfilePatch, Upsert, UserProfile};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

pub(crate) const NOT_FOUND_MESSAGE: &str = "User profile not found";

#[derive(Debug, Deserialize)]
struct ProfileArgs {
    owner: String,
    #[serde(flatten)]
    patch: ProfilePatch,
}

#[derive(Debug, Deserialize)]
struct OwnerArgs {
    owner: String,
}

fn profile_schema(with_attributes_note: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "owner": {"type": "string", "description": "User id or email"},
            "email": {"type": "string"},
            "gender": {"type": "string"},
            "date_of_birth": {"type": "string", "description": "YYYY-MM-DD"},
            "weight": {"type": "number", "description": "Weight in kg"},
            "height": {"type": "number", "description": "Height in cm"},
            "activity_level": {
                "type": "string",
                "description": "sedentary, light, moderate, active or very_active"
            },
            "dietary_preferences": {"type": "string"},
            "health_goals": {"type": "string"},
            "allergies": {"type": "string"},
            "medications": {"type": "string"},
            "attributes": {"type": "object", "description": with_attributes_note}
        },
        "required": ["owner"]
    })
}

fn upsert_response(result: Upsert<UserProfile>) -> Result<ToolResponse, ToolError> {
    let message = if result.created {
        "Profile created successfully"
    } else {
        "Profile updated successfully"
    };
    info!(
        "saved user profile (owner={}, created={})",
        result.record.owner, result.created
    );
    Ok(ToolResponse::success(to_value(&result.record)?).with_message(message))
}

/// Point lookup of the owner's profile; absence is not an error.
pub(crate) async fn fetch_profile(ctx: &ToolContext, owner: &str) -> Result<ToolResponse, ToolError> {
    let owner = require_owner(owner)?;
    match ctx.repository().profiles().get(&owner).await? {
        Some(profile) => Ok(ToolResponse::success(to_value(&profile)?)),
        None => Ok(ToolResponse::success(Value::Null).with_message(NOT_FOUND_MESSAGE)),
    }
}

/// Create or fully replace a profile.
#[derive(Debug, Default)]
pub struct CreateUserProfileTool;

#[async_trait]
impl Tool for CreateUserProfileTool {
    fn name(&self) -> &str {
        "create_user_profile"
    }

    fn description(&self) -> &str {
        "Create the user's profile, replacing any existing profile fields"
    }

    fn args_schema(&self) -> Value {
        profile_schema("Free-form extra profile data")
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: ProfileArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let result = ctx.repository().profiles().replace(&owner, &input.patch).await?;
        upsert_response(result)
    }
}

/// Merge fields into a profile, creating it when absent.
#[derive(Debug, Default)]
pub struct UpdateUserProfileTool;

#[async_trait]
impl Tool for UpdateUserProfileTool {
    fn name(&self) -> &str {
        "update_user_profile"
    }

    fn description(&self) -> &str {
        "Create or update the user's profile; only provided fields change"
    }

    fn args_schema(&self) -> Value {
        profile_schema("Keys merged into existing attributes; null removes a key")
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: ProfileArgs = parse_args(args)?;
        let owner = require_owner(&input.owner)?;
        let result = ctx.repository().profiles().update(&owner, &input.patch).await?;
        upsert_response(result)
    }
}

#[derive(Debug, Default)]
pub struct GetUserProfileTool;

#[async_trait]
impl Tool for GetUserProfileTool {
    fn name(&self) -> &str {
        "get_user_profile"
    }

    fn description(&self) -> &str {
        "Fetch the user's profile"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {"type": "string", "description": "User id or email"}
            },
            "required": ["owner"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: OwnerArgs = parse_args(args)?;
        fetch_profile(ctx, &input.owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateUserProfileTool, GetUserProfileTool, UpdateUserProfileTool};
    use crate::Tool;
    use crate::builtins::test_support::context;
    use lifetracker_protocol::ToolError;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn missing_profile_is_success_with_null_data() {
        let ctx = context();
        let response = GetUserProfileTool
            .call(&ctx, json!({"owner": "nobody"}))
            .await
            .expect("get");
        assert!(response.success);
        assert_eq!(response.data, Some(Value::Null));
        assert_eq!(response.message.as_deref(), Some("User profile not found"));
        assert_eq!(
            response.to_value(),
            json!({"success": true, "message": "User profile not found", "data": null})
        );
    }

    #[tokio::test]
    async fn update_merges_and_create_replaces() {
        let ctx = context();
        let first = UpdateUserProfileTool
            .call(
                &ctx,
                json!({
                    "owner": "u1",
                    "email": "u1@example.com",
                    "weight": 80.0,
                    "attributes": {"units": "metric", "theme": "dark"}
                }),
            )
            .await
            .expect("update");
        assert_eq!(first.message.as_deref(), Some("Profile created successfully"));

        let second = UpdateUserProfileTool
            .call(
                &ctx,
                json!({"owner": "u1", "weight": 78.5, "attributes": {"theme": null}}),
            )
            .await
            .expect("update");
        assert_eq!(second.message.as_deref(), Some("Profile updated successfully"));
        let data = second.data.expect("data");
        assert_eq!(data["email"], json!("u1@example.com"));
        assert_eq!(data["weight"], json!(78.5));
        assert_eq!(data["attributes"], json!({"units": "metric"}));

        let replaced = CreateUserProfileTool
            .call(&ctx, json!({"owner": "u1", "gender": "female"}))
            .await
            .expect("create");
        let data = replaced.data.expect("data");
        assert_eq!(data.get("email"), None);
        assert_eq!(data["gender"], json!("female"));

        let fetched = GetUserProfileTool
            .call(&ctx, json!({"owner": "u1"}))
            .await
            .expect("get");
        assert_eq!(fetched.data, Some(data));
    }

    #[tokio::test]
    async fn invalid_measurements_are_rejected() {
        let ctx = context();
        let err = UpdateUserProfileTool
            .call(&ctx, json!({"owner": "u1", "height": -1.0}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        let err = UpdateUserProfileTool
            .call(&ctx, json!({"owner": "u1", "height": "tall"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
