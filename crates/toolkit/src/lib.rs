//! Agent-framework tool adapters for the Connectors gateway.
//!
//! This crate binds tool catalog entries to validating adapters:
//!
//! - [`contracts`] — wire contracts shared with the gateway (tool definitions,
//!   selection options, structured execution results).
//! - [`adapter`] — [`adapter::ToolAdapter`], the per-tool unit that validates
//!   raw arguments against the schema built by `connectors-tool-schema` and
//!   forwards normalized arguments to an invocation collaborator.
//! - [`toolkit`] — [`toolkit::Toolkit`], which assembles adapters from a
//!   catalog (by integration or by semantic query).
//! - [`http`] — [`http::HttpConnectors`], a reqwest-based catalog + invoker
//!   collaborator speaking the Connectors gateway HTTP API.
//!
//! Adapters never retry, cache, or batch; each call is an independent
//! request/response unit and every failure path returns a structured result
//! rather than raising past the adapter boundary.

pub mod adapter;
pub mod contracts;
pub mod error;
pub mod http;
pub mod toolkit;

pub use adapter::{InvokeError, ToolAdapter, ToolInvoker};
pub use contracts::{ExecutionMetadata, ToolDefinition, ToolExecutionResult, ToolSelectionOptions};
pub use error::{Result, ToolkitError};
pub use http::{ConnectorsConfig, HttpConnectors};
pub use toolkit::{ToolCatalog, Toolkit, ToolkitConfig};
