//! Per-tool adapter: validate arguments, forward to the invocation collaborator.

use crate::contracts::{ExecutionMetadata, ToolDefinition, ToolExecutionResult};
use crate::error::Result;
use async_trait::async_trait;
use connectors_tool_schema::{ObjectValidator, ParameterSet, convert};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Error surfaced by an invocation collaborator.
///
/// `kind` is a best-effort classification carried into the result metadata as
/// `errorType` (e.g. `TimeoutError`, `ApiError`); collaborators that cannot
/// classify should use [`InvokeError::other`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvokeError {
    pub kind: String,
    pub message: String,
}

impl InvokeError {
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// An unclassified failure (generic `Error` kind).
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

/// The external component that performs a tool's real-world effect once
/// arguments are validated.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke `tool_id` with an already-validated argument record.
    async fn invoke(&self, tool_id: &str, arguments: Value) -> std::result::Result<Value, InvokeError>;
}

/// Binds one catalog tool to a sanitized name, a validator, and an invoker.
///
/// All fields are fixed at construction; an adapter is safe to share and call
/// concurrently without synchronization.
pub struct ToolAdapter {
    name: String,
    description: String,
    tool_id: String,
    integration: String,
    parameters: ParameterSet,
    schema: ObjectValidator,
    invoker: Arc<dyn ToolInvoker>,
}

impl std::fmt::Debug for ToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAdapter")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("tool_id", &self.tool_id)
            .field("integration", &self.integration)
            .field("parameters", &self.parameters)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ToolAdapter {
    /// Build an adapter from a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry's parameter description cannot be
    /// converted into a validator (invalid `pattern` constraint).
    pub fn from_definition(def: &ToolDefinition, invoker: Arc<dyn ToolInvoker>) -> Result<Self> {
        let parameters = ParameterSet::from_raw(def.parameters.as_ref());
        let schema = convert(&parameters)?;

        Ok(Self {
            name: sanitize_tool_name(&def.id),
            description: def
                .description
                .clone()
                .unwrap_or_else(|| format!("Execute {}", def.id)),
            tool_id: def.id.clone(),
            integration: def
                .integration
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            parameters,
            schema,
            invoker,
        })
    }

    /// Exposed tool name (`[A-Za-z0-9_]+`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Original catalog identifier.
    #[must_use]
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    #[must_use]
    pub fn integration(&self) -> &str {
        &self.integration
    }

    /// JSON-Schema-style advertisement of this tool's parameter set.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        self.parameters.to_input_schema()
    }

    /// Adapter metadata summary (name, ids, advertised schema).
    #[must_use]
    pub fn metadata(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "toolId": self.tool_id,
            "integration": self.integration,
            "inputSchema": self.input_schema(),
        })
    }

    /// Execute one tool call: validate, forward, wrap.
    ///
    /// Validation failures short-circuit without touching the downstream
    /// collaborator; downstream failures are caught at this boundary. Either
    /// way the caller gets a structured result, never a raised error. At most
    /// one downstream attempt is made per call.
    pub async fn call(&self, arguments: &Value) -> ToolExecutionResult {
        let start = Instant::now();

        let validated = match self.schema.validate(arguments) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::debug!(tool_id = %self.tool_id, error = %e, "tool arguments failed validation");
                return ToolExecutionResult::failure(
                    e.to_string(),
                    "ValidationError",
                    self.metadata_for(start),
                );
            }
        };

        match self.invoker.invoke(&self.tool_id, validated).await {
            Ok(data) => ToolExecutionResult::success(data, self.metadata_for(start)),
            Err(e) => {
                tracing::debug!(tool_id = %self.tool_id, kind = %e.kind, error = %e.message, "tool invocation failed");
                let kind = e.kind.clone();
                ToolExecutionResult::failure(e.message, kind, self.metadata_for(start))
            }
        }
    }

    /// Execute a call and serialize the structured result to JSON text (the
    /// shape agent frameworks consume as the tool's return value).
    pub async fn call_text(&self, arguments: &Value) -> String {
        let result = self.call(arguments).await;
        serde_json::to_string(&result).unwrap_or_else(|e| {
            format!("{{\"success\":false,\"error\":\"failed to serialize result: {e}\"}}")
        })
    }

    fn metadata_for(&self, start: Instant) -> ExecutionMetadata {
        ExecutionMetadata {
            execution_time: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            tool_id: self.tool_id.clone(),
            integration: self.integration.clone(),
            error_type: None,
        }
    }
}

/// Replace anything outside `[A-Za-z0-9_]` with `_` to satisfy agent-protocol
/// name syntax. Purely mechanical; collisions are tolerated.
fn sanitize_tool_name(tool_id: &str) -> String {
    tool_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
