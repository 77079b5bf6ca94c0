//! Utility helpers shared by built-in tools.

use chrono::{DateTime, Utc};
use lifetracker_protocol::{ReadPathLabel, ToolError, ToolResponse};
use lifetracker_store::{Condition, ReadPath, timestamp, validate_owner};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse JSON args into a typed struct for tool calls.
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Trimmed owner, rejected when blank or too long.
pub(super) fn require_owner(owner: &str) -> Result<String, ToolError> {
    let owner = owner.trim();
    validate_owner(owner)?;
    Ok(owner.to_string())
}

/// Trimmed value of a required text argument.
pub(super) fn require_text(field: &str, value: &str) -> Result<String, ToolError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ToolError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

/// Optional text filter; blank values count as absent.
pub(super) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an optional RFC 3339 argument.
pub(super) fn parse_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ToolError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            timestamp::parse(value).map_err(|err| {
                ToolError::Validation(format!("{field} must be an RFC 3339 timestamp: {err}"))
            })
        })
        .transpose()
}

/// Inclusive `timestamp` bounds in stored text form.
pub(super) fn date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<Condition>, ToolError> {
    let start = parse_timestamp("start_date", start)?;
    let end = parse_timestamp("end_date", end)?;
    if matches!((start, end), (Some(start), Some(end)) if start > end) {
        return Err(ToolError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    let mut conditions = Vec::new();
    if let Some(start) = start {
        conditions.push(Condition::at_least("timestamp", timestamp::format(&start)));
    }
    if let Some(end) = end {
        conditions.push(Condition::at_most("timestamp", timestamp::format(&end)));
    }
    Ok(conditions)
}

/// Nested payload arguments must be JSON objects.
pub(super) fn require_object(field: &str, value: Option<Value>) -> Result<Option<Value>, ToolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => Ok(Some(value)),
        Some(_) => Err(ToolError::Validation(format!("{field} must be a JSON object"))),
    }
}

pub(super) fn to_value<T: Serialize>(record: &T) -> Result<Value, ToolError> {
    serde_json::to_value(record)
        .map_err(|err| ToolError::Validation(format!("failed to encode record: {err}")))
}

/// List envelope with count and read path.
pub(super) fn listing<T: Serialize>(items: &[T], path: ReadPath) -> Result<ToolResponse, ToolError> {
    let items = items.iter().map(to_value).collect::<Result<Vec<_>, _>>()?;
    let label = match path {
        ReadPath::Index => ReadPathLabel::Index,
        ReadPath::Scan => ReadPathLabel::Scan,
    };
    Ok(ToolResponse::listing(items, label))
}
