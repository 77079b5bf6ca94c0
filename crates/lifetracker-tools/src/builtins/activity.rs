//! Activity log tools.

use crate::builtins::utils::{
    date_range, listing, parse_args, parse_timestamp, require_object, require_owner, require_text,
    to_value,
};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use lifetracker_protocol::{ToolError, ToolResponse};
use lifetracker_store::{
    ActivityLog, ActivityType, Condition, ExerciseProcessedData, FoodProcessedData,
};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

const CREATED_MESSAGE: &str = "Activity log created successfully";

fn timestamp_schema() -> Value {
    json!({
        "type": "string",
        "description": "RFC 3339 time of the activity; defaults to now"
    })
}

fn owner_schema() -> Value {
    json!({
        "type": "string",
        "description": "User id or email the activity belongs to"
    })
}

/// Validate and persist one activity log.
async fn create_log(
    ctx: &ToolContext,
    owner: &str,
    activity_type: ActivityType,
    raw_input: &str,
    processed_data: Option<Value>,
    timestamp: Option<&str>,
) -> Result<ToolResponse, ToolError> {
    let owner = require_owner(owner)?;
    let raw_input = require_text("raw_input", raw_input)?;
    let timestamp = parse_timestamp("timestamp", timestamp)?;
    let log = ActivityLog::new(owner, activity_type, raw_input, processed_data, timestamp);
    let log = ctx.repository().activity_logs().create(log).await?;
    info!(
        "created activity log (id={}, type={})",
        log.id, log.activity_type
    );
    Ok(ToolResponse::success(to_value(&log)?).with_message(CREATED_MESSAGE))
}

/// Filters accepted by activity listings.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct ActivityQuery {
    pub owner: String,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// List activity logs newest first.
pub(crate) async fn list_activities(
    ctx: &ToolContext,
    query: ActivityQuery,
) -> Result<ToolResponse, ToolError> {
    let owner = require_owner(&query.owner)?;
    let limit = ctx.resolve_limit(query.limit)?;
    let mut filters = Vec::new();
    if let Some(kind) = query
        .activity_type
        .as_deref()
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
    {
        let kind: ActivityType = kind.parse().map_err(ToolError::Validation)?;
        filters.push(Condition::equals("activityType", kind.as_str()));
    }
    filters.extend(date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?);

    // Storage order is not time order, so the limit applies after sorting.
    let mut result = ctx
        .repository()
        .activity_logs()
        .list_by_owner(&owner, filters, usize::MAX)
        .await?;
    result
        .items
        .sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    result.items.truncate(limit);
    listing(&result.items, result.path)
}

/// Generic activity log creation.
#[derive(Debug, Default)]
pub struct CreateActivityLogTool;

#[derive(Debug, Deserialize)]
struct CreateActivityLogArgs {
    owner: String,
    activity_type: String,
    raw_input: String,
    #[serde(default)]
    processed_data: Option<Value>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[async_trait]
impl Tool for CreateActivityLogTool {
    fn name(&self) -> &str {
        "create_activity_log"
    }

    fn description(&self) -> &str {
        "Create an activity log entry of any type with optional structured data"
    }

    fn args_schema(&self) -> Value {
        let kinds: Vec<&str> = ActivityType::ALL.iter().map(ActivityType::as_str).collect();
        json!({
            "type": "object",
            "properties": {
                "owner": owner_schema(),
                "activity_type": {"type": "string", "enum": kinds},
                "raw_input": {
                    "type": "string",
                    "description": "Original text the user entered"
                },
                "processed_data": {
                    "type": "object",
                    "description": "Structured interpretation of the input"
                },
                "timestamp": timestamp_schema()
            },
            "required": ["owner", "activity_type", "raw_input"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: CreateActivityLogArgs = parse_args(args)?;
        let activity_type: ActivityType =
            input.activity_type.parse().map_err(ToolError::Validation)?;
        let processed_data = require_object("processed_data", input.processed_data)?;
        create_log(
            ctx,
            &input.owner,
            activity_type,
            &input.raw_input,
            processed_data,
            input.timestamp.as_deref(),
        )
        .await
    }
}

/// Food or drink log with validated nutritional data.
#[derive(Debug, Default)]
pub struct CreateFoodOrDrinkActivityLogTool;

#[derive(Debug, Deserialize)]
struct CreateFoodOrDrinkArgs {
    owner: String,
    activity_type: String,
    raw_input: String,
    processed_data: FoodProcessedData,
    #[serde(default)]
    timestamp: Option<String>,
}

#[async_trait]
impl Tool for CreateFoodOrDrinkActivityLogTool {
    fn name(&self) -> &str {
        "create_food_or_drink_activity_log"
    }

    fn description(&self) -> &str {
        "Create a food or drink activity log with structured nutritional data"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": owner_schema(),
                "activity_type": {"type": "string", "enum": ["food", "drink"]},
                "raw_input": {
                    "type": "string",
                    "description": "What the user said they ate or drank"
                },
                "processed_data": {
                    "type": "object",
                    "properties": {
                        "description": {
                            "type": "string",
                            "description": "Detailed interpretation, e.g. '150g grilled chicken breast'"
                        },
                        "estimated_portion_size": {"type": "string"},
                        "macro_nutrients": {
                            "type": "object",
                            "additionalProperties": {"type": "number"},
                            "description": "Grams per macronutrient, e.g. {\"protein\": 2.0}"
                        },
                        "micro_nutrients": {
                            "type": "object",
                            "additionalProperties": {"type": "string"},
                            "description": "Amounts per micronutrient, e.g. {\"potassium\": \"485mg\"}"
                        },
                        "glycemic_load": {"type": "integer", "minimum": 0, "maximum": 50}
                    },
                    "required": ["description", "macro_nutrients", "micro_nutrients", "glycemic_load"]
                },
                "timestamp": timestamp_schema()
            },
            "required": ["owner", "activity_type", "raw_input", "processed_data"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: CreateFoodOrDrinkArgs = parse_args(args)?;
        let activity_type: ActivityType =
            input.activity_type.parse().map_err(ToolError::Validation)?;
        if !activity_type.is_food_or_drink() {
            return Err(ToolError::Validation(format!(
                "activity_type must be food or drink, got {activity_type}"
            )));
        }
        input
            .processed_data
            .validate()
            .map_err(ToolError::Validation)?;
        let processed_data = to_value(&input.processed_data)?;
        create_log(
            ctx,
            &input.owner,
            activity_type,
            &input.raw_input,
            Some(processed_data),
            input.timestamp.as_deref(),
        )
        .await
    }
}

/// Exercise log with validated session data.
#[derive(Debug, Default)]
pub struct CreateExerciseActivityLogTool;

#[derive(Debug, Deserialize)]
struct CreateExerciseArgs {
    owner: String,
    raw_input: String,
    processed_data: ExerciseProcessedData,
    #[serde(default)]
    timestamp: Option<String>,
}

#[async_trait]
impl Tool for CreateExerciseActivityLogTool {
    fn name(&self) -> &str {
        "create_exercise_activity_log"
    }

    fn description(&self) -> &str {
        "Create an exercise activity log with duration, type and intensity"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "owner": owner_schema(),
                "raw_input": {"type": "string"},
                "processed_data": {
                    "type": "object",
                    "properties": {
                        "duration_min": {"type": "integer", "minimum": 1},
                        "exercise_type": {
                            "type": "string",
                            "description": "e.g. running, weightlifting, yoga"
                        },
                        "intensity": {"type": "string", "enum": ["low", "moderate", "high"]}
                    },
                    "required": ["duration_min", "exercise_type"]
                },
                "timestamp": timestamp_schema()
            },
            "required": ["owner", "raw_input", "processed_data"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let input: CreateExerciseArgs = parse_args(args)?;
        input
            .processed_data
            .validate()
            .map_err(ToolError::Validation)?;
        let processed_data = to_value(&input.processed_data)?;
        create_log(
            ctx,
            &input.owner,
            ActivityType::Exercise,
            &input.raw_input,
            Some(processed_data),
            input.timestamp.as_deref(),
        )
        .await
    }
}

/// Owner listing with type and date filters.
#[derive(Debug, Default)]
pub struct GetActivityLogsTool;

#[async_trait]
impl Tool for GetActivityLogsTool {
    fn name(&self) -> &str {
        "get_activity_logs"
    }

    fn description(&self) -> &str {
        "Fetch a user's activity logs, newest first, filtered by type and date range"
    }

    fn args_schema(&self) -> Value {
        let kinds: Vec<&str> = ActivityType::ALL.iter().map(ActivityType::as_str).collect();
        json!({
            "type": "object",
            "properties": {
                "owner": owner_schema(),
                "activity_type": {"type": "string", "enum": kinds},
                "start_date": {
                    "type": "string",
                    "description": "Inclusive lower bound (RFC 3339)"
                },
                "end_date": {
                    "type": "string",
                    "description": "Inclusive upper bound (RFC 3339)"
                },
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 50}
            },
            "required": ["owner"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolResponse, ToolError> {
        let query: ActivityQuery = parse_args(args)?;
        list_activities(ctx, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CreateActivityLogTool, CreateExerciseActivityLogTool, CreateFoodOrDrinkActivityLogTool,
        GetActivityLogsTool,
    };
    use crate::builtins::test_support::context;
    use crate::{Tool, ToolContext};
    use lifetracker_protocol::{ReadPathLabel, ToolError};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    async fn log(ctx: &ToolContext, kind: &str, timestamp: &str) {
        CreateActivityLogTool
            .call(
                ctx,
                json!({
                    "owner": "u1",
                    "activity_type": kind,
                    "raw_input": format!("{kind} at {timestamp}"),
                    "timestamp": timestamp
                }),
            )
            .await
            .expect("create");
    }

    #[tokio::test]
    async fn food_log_validates_payload() {
        let ctx = context();
        let valid = json!({
            "owner": "u1",
            "activity_type": "drink",
            "raw_input": "black coffee",
            "processed_data": {
                "description": "one cup of black coffee",
                "macro_nutrients": {"protein": 0.3},
                "micro_nutrients": {"potassium": "116mg"},
                "glycemic_load": 0
            }
        });
        let response = CreateFoodOrDrinkActivityLogTool
            .call(&ctx, valid.clone())
            .await
            .expect("create");
        assert_eq!(response.message.as_deref(), Some("Activity log created successfully"));
        let data = response.data.expect("data");
        assert_eq!(data["activityType"], json!("drink"));
        assert_eq!(data["processedData"]["glycemic_load"], json!(0));
        assert!(data["id"].as_str().is_some_and(|id| id.starts_with("activity-")));

        let mut too_high = valid.clone();
        too_high["processed_data"]["glycemic_load"] = json!(51);
        let err = CreateFoodOrDrinkActivityLogTool
            .call(&ctx, too_high)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));

        let mut wrong_kind = valid;
        wrong_kind["activity_type"] = json!("sleep");
        let err = CreateFoodOrDrinkActivityLogTool
            .call(&ctx, wrong_kind)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn exercise_log_is_typed_exercise() {
        let ctx = context();
        let response = CreateExerciseActivityLogTool
            .call(
                &ctx,
                json!({
                    "owner": "u1",
                    "raw_input": "ran 5k",
                    "processed_data": {"duration_min": 28, "exercise_type": "running"}
                }),
            )
            .await
            .expect("create");
        assert_eq!(response.data.expect("data")["activityType"], json!("exercise"));

        let err = CreateExerciseActivityLogTool
            .call(
                &ctx,
                json!({
                    "owner": "u1",
                    "raw_input": "stretched",
                    "processed_data": {"duration_min": 0, "exercise_type": "yoga"}
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_filters_and_sorts_newest_first() {
        let ctx = context();
        log(&ctx, "food", "2025-01-01T08:00:00Z").await;
        log(&ctx, "food", "2025-01-03T08:00:00Z").await;
        log(&ctx, "sleep", "2025-01-02T22:00:00Z").await;
        log(&ctx, "food", "2025-02-01T08:00:00Z").await;

        let response = GetActivityLogsTool
            .call(
                &ctx,
                json!({
                    "owner": "u1",
                    "activity_type": "food",
                    "start_date": "2025-01-01T08:00:00Z",
                    "end_date": "2025-01-31T23:59:59Z"
                }),
            )
            .await
            .expect("list");
        assert_eq!(response.count, Some(2));
        assert_eq!(response.read_path, Some(ReadPathLabel::Scan));
        let timestamps: Vec<Value> = response
            .data
            .expect("data")
            .as_array()
            .expect("array")
            .iter()
            .map(|item| item["timestamp"].clone())
            .collect();
        assert_eq!(
            timestamps,
            vec![
                json!("2025-01-03T08:00:00.000Z"),
                json!("2025-01-01T08:00:00.000Z")
            ]
        );
    }

    #[tokio::test]
    async fn limit_keeps_the_newest_logs() {
        let ctx = context();
        for day in ["05", "01", "09", "03", "07"] {
            log(&ctx, "drink", &format!("2025-03-{day}T12:00:00Z")).await;
        }
        let response = GetActivityLogsTool
            .call(&ctx, json!({"owner": "u1", "limit": 2}))
            .await
            .expect("list");
        let data = response.data.expect("data");
        assert_eq!(data[0]["timestamp"], json!("2025-03-09T12:00:00.000Z"));
        assert_eq!(data[1]["timestamp"], json!("2025-03-07T12:00:00.000Z"));
    }

    #[tokio::test]
    async fn listing_rejects_bad_arguments() {
        let ctx = context();
        for args in [
            json!({"owner": "u1", "limit": 0}),
            json!({"owner": "u1", "limit": 101}),
            json!({"owner": "u1", "activity_type": "brunch"}),
            json!({"owner": "u1", "start_date": "last week"}),
            json!({"owner": ""}),
        ] {
            let err = GetActivityLogsTool.call(&ctx, args).await.unwrap_err();
            assert!(matches!(err, ToolError::Validation(_)), "{err:?}");
        }
        let err = GetActivityLogsTool.call(&ctx, json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
