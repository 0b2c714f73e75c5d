use core::fmt;
use std::sync::Arc;

use crate::compiler::{Program, RuntimeError};
use crate::expr::Expr;
use crate::types::Ty;
use crate::values::Value;

/// A compiled mapping from one type to another.
///
/// Cloning is cheap and clones share the compiled program. Mapping touches
/// no shared state, so a mapper can be used from many threads at once.
#[derive(Clone)]
pub struct Mapper(Arc<MapperInner>);

struct MapperInner {
    source: Ty,
    target: Ty,
    expr: Expr,
    program: Program,
}

impl Mapper {
    pub(crate) fn new(source: Ty, target: Ty, expr: Expr, program: Program) -> Self {
        Mapper(Arc::new(MapperInner {
            source,
            target,
            expr,
            program,
        }))
    }

    pub fn source(&self) -> &Ty {
        &self.0.source
    }

    pub fn target(&self) -> &Ty {
        &self.0.target
    }

    /// The generated mapping program, before compilation.
    pub fn program(&self) -> &Expr {
        &self.0.expr
    }

    /// Whether both handles share one compiled program.
    pub fn ptr_eq(&self, other: &Mapper) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Map `input` to a target value.
    pub fn map(&self, input: &Value) -> Result<Value, RuntimeError> {
        if !input.conforms_to(&self.0.source) {
            return Err(RuntimeError::InputMismatch {
                expected: self.0.source.to_string(),
                found: input.type_name(),
            });
        }
        self.0.program.run(input.clone())
    }
}

impl fmt::Display for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.expr)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("source", &self.0.source)
            .field("target", &self.0.target)
            .finish_non_exhaustive()
    }
}
