//! Immutable expression algebra the mapping generator emits.
//!
//! Trees are built bottom-up through the typed constructors on [`Expr`] and
//! transformed by passes that return new trees (see `rewrite.rs`).

mod display;
mod rewrite;

use core::fmt;
use std::sync::Arc;

use crate::mapping::ConfigError;
use crate::types::{ConversionOp, MemberRef, Ty};
use crate::values::Value;

/// Identifies a parameter or local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) u32);

impl Var {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hands out fresh variables for one compilation.
#[derive(Debug, Default)]
pub(crate) struct VarAllocator {
    next: u32,
}

impl VarAllocator {
    pub(crate) fn starting_at(next: u32) -> Self {
        VarAllocator { next }
    }

    pub(crate) fn fresh(&mut self) -> Var {
        let var = Var(self.next);
        self.next += 1;
        var
    }
}

#[derive(Clone)]
pub struct Expr {
    ty: Ty,
    kind: ExprKind,
}

#[derive(Clone)]
pub enum ExprKind {
    Param {
        var: Var,
        name: Arc<str>,
    },
    Local {
        var: Var,
        name: Arc<str>,
    },
    /// `default(T)`.
    Default,
    Constant(Value),
    Member {
        target: Box<Expr>,
        member: MemberRef,
    },
    Convert {
        operand: Box<Expr>,
        op: ConvertOp,
    },
    /// Runtime type test: the operand if it is an instance of the node type,
    /// null otherwise.
    TypeAs(Box<Expr>),
    Coalesce {
        value: Box<Expr>,
        fallback: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    IsNull(Box<Expr>),
    /// `new T()`.
    New,
    /// Sequence literal of the node type.
    NewSeq(Vec<Expr>),
    /// Materialize the items of an iterable into a fresh sequence of the node
    /// type, checking each item against `cast` when present.
    CollectSeq {
        source: Box<Expr>,
        cast: Option<Ty>,
    },
    Call {
        func: Callee,
        args: Vec<Expr>,
    },
    Assign {
        place: Box<Expr>,
        value: Box<Expr>,
    },
    /// Statements evaluated in order; the last one is the block's value.
    Block {
        locals: Vec<Local>,
        body: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOp {
    /// Representation-preserving: boxing, nullable wrapping, base class.
    Upcast,
    /// Enum to or from its underlying integer.
    Numeric,
    /// Checked downcast, fails at runtime on a mismatch.
    Cast,
}

#[derive(Debug, Clone)]
pub struct Local {
    pub var: Var,
    pub name: Arc<str>,
    pub ty: Ty,
}

#[derive(Clone)]
pub enum Callee {
    /// Case-insensitive enum parse, zero on failure.
    ParseEnum,
    /// Generic scalar conversion.
    ChangeType,
    ToString,
    Operator(ConversionOp),
    Host(HostFn),
}

pub type HostFnImpl = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A host function callable from source expressions.
#[derive(Clone)]
pub struct HostFn {
    name: Arc<str>,
    func: HostFnImpl,
}

impl HostFn {
    pub fn new(name: &str, func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        HostFn {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for HostFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFn({})", self.name)
    }
}

impl Expr {
    pub(crate) fn new(ty: Ty, kind: ExprKind) -> Self {
        Expr { ty, kind }
    }

    /// Static type of the value this expression produces.
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub(crate) fn param(var: Var, name: &str, ty: &Ty) -> Expr {
        Expr::new(
            ty.clone(),
            ExprKind::Param {
                var,
                name: name.into(),
            },
        )
    }

    pub(crate) fn local(local: &Local) -> Expr {
        Expr::new(
            local.ty.clone(),
            ExprKind::Local {
                var: local.var,
                name: local.name.clone(),
            },
        )
    }

    pub fn default(ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::Default)
    }

    pub fn constant(value: Value, ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::Constant(value))
    }

    pub fn construct(ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::New)
    }

    pub fn member(self, member: &MemberRef) -> Expr {
        Expr::new(
            member.ty().clone(),
            ExprKind::Member {
                target: Box::new(self),
                member: member.clone(),
            },
        )
    }

    /// Access a member by name.
    pub fn field(self, name: &str) -> Result<Expr, ConfigError> {
        match self.ty.find_member(name) {
            Some(member) if member.is_static() => Err(ConfigError::StaticMember {
                ty: self.ty.to_string(),
                name: name.to_string(),
            }),
            Some(member) => Ok(self.member(&member)),
            None => {
                let path = self.to_string();
                Err(ConfigError::UnknownMember {
                    ty: self.ty.to_string(),
                    name: name.to_string(),
                    offset: path.len() + 1,
                    path: format!("{}.{}", path, name),
                })
            }
        }
    }

    pub fn convert(self, op: ConvertOp, ty: &Ty) -> Expr {
        Expr::new(
            ty.clone(),
            ExprKind::Convert {
                operand: Box::new(self),
                op,
            },
        )
    }

    /// Upcast unless the types already match.
    pub(crate) fn upcast(self, ty: &Ty) -> Expr {
        if &self.ty == ty {
            self
        } else {
            self.convert(ConvertOp::Upcast, ty)
        }
    }

    pub fn type_as(self, ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::TypeAs(Box::new(self)))
    }

    /// `self ?? fallback`, typed as the fallback.
    pub fn coalesce(self, fallback: Expr) -> Expr {
        Expr::new(
            fallback.ty.clone(),
            ExprKind::Coalesce {
                value: Box::new(self),
                fallback: Box::new(fallback),
            },
        )
    }

    pub fn conditional(test: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::new(
            then.ty.clone(),
            ExprKind::Conditional {
                test: Box::new(test),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
        )
    }

    pub fn is_null(self) -> Expr {
        Expr::new(Ty::bool(), ExprKind::IsNull(Box::new(self)))
    }

    pub fn new_seq(ty: &Ty, items: Vec<Expr>) -> Expr {
        Expr::new(ty.clone(), ExprKind::NewSeq(items))
    }

    pub fn collect_seq(self, ty: &Ty, cast: Option<Ty>) -> Expr {
        Expr::new(
            ty.clone(),
            ExprKind::CollectSeq {
                source: Box::new(self),
                cast,
            },
        )
    }

    pub fn call(func: Callee, args: Vec<Expr>, ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::Call { func, args })
    }

    /// Invoke a host function on the given arguments.
    pub fn host_call(
        name: &str,
        args: Vec<Expr>,
        ty: &Ty,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Expr {
        Expr::call(Callee::Host(HostFn::new(name, func)), args, ty)
    }

    pub fn assign(place: Expr, value: Expr) -> Expr {
        Expr::new(
            value.ty.clone(),
            ExprKind::Assign {
                place: Box::new(place),
                value: Box::new(value),
            },
        )
    }

    pub fn block(locals: Vec<Local>, body: Vec<Expr>, ty: &Ty) -> Expr {
        Expr::new(ty.clone(), ExprKind::Block { locals, body })
    }

    pub(crate) fn is_variable(&self) -> bool {
        matches!(self.kind, ExprKind::Param { .. } | ExprKind::Local { .. })
    }

    pub(crate) fn variable(&self) -> Option<Var> {
        match &self.kind {
            ExprKind::Param { var, .. } | ExprKind::Local { var, .. } => Some(*var),
            _ => None,
        }
    }
}
