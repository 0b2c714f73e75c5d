use thiserror::Error;

use crate::values::ConversionError;

/// The expression tree cannot be turned into a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("cannot assign to `{expr}`: it does not denote a storage location")]
    NotAddressable { expr: String },
}

/// Failure while running a compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("input of type {found} does not conform to {expected}")]
    InputMismatch { expected: String, found: String },
}
