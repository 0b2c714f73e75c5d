//! Public error type for the mapping API.
//!
//! Each subsystem reports its own error enum; they meet here so callers can
//! use `?` across type definition, building and running.

use thiserror::Error;

use crate::compiler::{CompileError, RuntimeError};
use crate::mapping::ConfigError;
use crate::types::TypeError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid type definition.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Invalid bindings or unsupported conversions, reported by `build`.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Failure while mapping a value.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
