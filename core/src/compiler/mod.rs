//! Compilation of expression trees into executable programs.
//!
//! The tree is lowered once into nested closures; running a [`Program`]
//! allocates a fresh frame per call and touches no shared state, so one
//! program can be run from many threads at once.

mod error;
mod lower;

#[cfg(test)]
mod compiler_test;

pub use error::{CompileError, RuntimeError};

use core::fmt;

use crate::expr::{Expr, Var};
use crate::types::Ty;
use crate::values::Value;
use lower::{Frame, Thunk};

pub struct Program {
    root: Thunk,
    frame_size: usize,
    input: Var,
    ty: Ty,
}

impl Program {
    /// Compile `expr`, which reads its argument from `input`.
    pub(crate) fn compile(expr: &Expr, input: Var) -> Result<Self, CompileError> {
        let mut max = input.index();
        lower::max_var(expr, &mut max);
        let root = lower::lower(expr)?;
        tracing::trace!(frame_size = max + 1, "Compiled program");
        Ok(Program {
            root,
            frame_size: max + 1,
            input,
            ty: expr.ty().clone(),
        })
    }

    /// Static type of the produced value.
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn run(&self, input: Value) -> Result<Value, RuntimeError> {
        let mut frame = Frame::new(self.frame_size);
        frame.set(self.input.index(), input);
        (self.root)(&mut frame)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("ty", &self.ty)
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}
