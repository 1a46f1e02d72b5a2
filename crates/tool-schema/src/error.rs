//! Error types for `connectors-tool-schema`.

use thiserror::Error;

/// Main error type for schema conversion.
///
/// Descriptor normalization never fails (malformed containers degrade to
/// empty/best-effort descriptor lists); the only thing that can go wrong while
/// building a validator is a constraint that cannot be compiled.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `pattern` constraint is not a valid regular expression.
    #[error("Invalid pattern for parameter '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for schema conversion operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
