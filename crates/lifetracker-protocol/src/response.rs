//! Structured tool response envelope.

use crate::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which read path served a list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPathLabel {
    /// Served by a secondary index on the owner attribute.
    Index,
    /// Served by a strongly consistent filtered scan.
    Scan,
}

/// Envelope returned to the remote caller for every call.
///
/// Serialized as `{"success": true, "data": ...}` on success and
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_path: Option<ReadPathLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ToolResponse {
    /// Successful response carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            read_path: None,
            data: Some(data),
            error: None,
            retryable: None,
        }
    }

    /// Successful list response; `count` is taken from the array length.
    pub fn listing(items: Vec<Value>, read_path: ReadPathLabel) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            read_path: Some(read_path),
            ..Self::success(Value::Array(items))
        }
    }

    /// Failed response built from a tool error.
    pub fn failure(err: &ToolError) -> Self {
        Self {
            success: false,
            message: None,
            count: None,
            read_path: None,
            data: None,
            error: Some(err.to_string()),
            retryable: err.is_retryable().then_some(true),
        }
    }

    /// Attach a human readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Serialize the envelope as pretty JSON text.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| {
            format!("{{\"success\": false, \"error\": \"failed to encode response: {err}\"}}")
        })
    }

    /// Serialize the envelope as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Result<ToolResponse, ToolError>> for ToolResponse {
    fn from(result: Result<ToolResponse, ToolError>) -> Self {
        match result {
            Ok(response) => response,
            Err(err) => ToolResponse::failure(&err),
        }
    }
}
