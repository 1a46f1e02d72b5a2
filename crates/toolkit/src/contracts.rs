//! Wire contracts shared with the Connectors gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool catalog entry as delivered by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool identifier, e.g. `github.create-pull-request@v1`.
    pub id: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Integration/source label, e.g. `github`.
    #[serde(default)]
    pub integration: Option<String>,

    /// Free-form parameter container in one of the two raw shapes accepted by
    /// descriptor normalization (JSON-Schema-style or flat record). Absent or
    /// malformed containers yield a tool that takes no arguments.
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// Options for semantic tool selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSelectionOptions {
    /// Maximum number of tools to select.
    #[serde(default = "default_max_tools")]
    pub max_tools: usize,

    /// Categories to filter by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Minimum relevance score (0-1).
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for ToolSelectionOptions {
    fn default() -> Self {
        Self {
            max_tools: default_max_tools(),
            categories: Vec::new(),
            min_score: default_min_score(),
        }
    }
}

fn default_max_tools() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.7
}

/// Structured result of one tool invocation.
///
/// Both validation failures and downstream failures are expressed through this
/// shape; callers consume it as the tool's return value either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionResult {
    pub success: bool,

    /// Opaque result payload (present iff `success`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Error message (present iff not `success`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub metadata: ExecutionMetadata,
}

impl ToolExecutionResult {
    #[must_use]
    pub fn success(data: Value, metadata: ExecutionMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>, error_type: impl Into<String>, mut metadata: ExecutionMetadata) -> Self {
        metadata.error_type = Some(error_type.into());
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata,
        }
    }
}

/// Invocation metadata attached to every execution result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    /// Elapsed wall-clock time in milliseconds.
    pub execution_time: u64,

    pub tool_id: String,

    pub integration: String,

    /// Best-effort classification of the failure (`ValidationError`,
    /// `TimeoutError`, `ApiError`, ...). Absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_tolerates_missing_fields() {
        let def: ToolDefinition = serde_json::from_value(json!({"id": "slack.post-message"})).unwrap();
        assert_eq!(def.id, "slack.post-message");
        assert!(def.description.is_none());
        assert!(def.parameters.is_none());
    }

    #[test]
    fn test_selection_options_defaults() {
        let options = ToolSelectionOptions::default();
        assert_eq!(options.max_tools, 10);
        assert!((options.min_score - 0.7).abs() < f64::EPSILON);
        assert!(options.categories.is_empty());
    }

    #[test]
    fn test_execution_result_wire_shape() {
        let result = ToolExecutionResult::failure(
            "API error",
            "ApiError",
            ExecutionMetadata {
                execution_time: 12,
                tool_id: "github.create-pull-request@v1".to_string(),
                integration: "github".to_string(),
                error_type: None,
            },
        );
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["success"], json!(false));
        assert_eq!(wire["error"], json!("API error"));
        assert_eq!(wire["metadata"]["errorType"], json!("ApiError"));
        assert_eq!(wire["metadata"]["toolId"], json!("github.create-pull-request@v1"));
        assert!(wire.get("data").is_none());
    }
}
