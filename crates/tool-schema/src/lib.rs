//! Parameter descriptor normalization and validator construction for Connectors tools.
//!
//! This crate is intended to be used by:
//! - `connectors-toolkit` (agent-framework tool adapters)
//!
//! It turns the free-form parameter containers delivered by a tool catalog into
//! ordered [`descriptor::ParameterSet`]s, and converts those into reusable
//! [`validator::ObjectValidator`]s that check and normalize candidate argument
//! records. It intentionally contains **no** I/O and **no** invocation logic.

pub mod descriptor;
pub mod error;
pub mod validator;

pub use descriptor::{ParamType, ParameterDescriptor, ParameterSet};
pub use error::{Result, SchemaError};
pub use validator::{ObjectValidator, ValidationError, Violation, convert};
