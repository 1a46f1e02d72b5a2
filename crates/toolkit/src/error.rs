//! Error types for `connectors-toolkit`.

use thiserror::Error;

/// Main error type for toolkit operations.
///
/// Note that tool *invocation* failures are not represented here: the adapter
/// converts both validation and downstream failures into structured
/// [`crate::contracts::ToolExecutionResult`] values instead of raising.
#[derive(Error, Debug)]
pub enum ToolkitError {
    /// Configuration errors (invalid base URL, missing tool sources).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool catalog errors (integration lookup or selection failed).
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Schema conversion errors (a catalog entry carries an unbuildable
    /// parameter description).
    #[error("Schema error: {0}")]
    Schema(#[from] connectors_tool_schema::SchemaError),

    /// HTTP errors while talking to the gateway.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON decoding errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
