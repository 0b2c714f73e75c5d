use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;
use std::sync::Arc;

use crate::types::Ty;
use crate::values::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// How a member slot is filled when its owner is constructed.
#[derive(Debug, Clone)]
pub enum Initializer {
    /// Zero value of the member type (null for references).
    Zero,
    /// A fresh instance from the member type's default constructor.
    Construct,
    Constant(Value),
}

#[derive(Debug)]
pub struct Member {
    pub(crate) name: String,
    pub(crate) owner: String,
    pub(crate) ty: Ty,
    pub(crate) kind: MemberKind,
    pub(crate) is_static: bool,
    pub(crate) readable: bool,
    pub(crate) writable: bool,
    pub(crate) initializer: Initializer,
    pub(crate) slot: usize,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the type that declared this member.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn initializer(&self) -> &Initializer {
        &self.initializer
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }
}

/// Shared handle to a member descriptor, compared by identity.
#[derive(Clone)]
pub struct MemberRef(pub(crate) Arc<Member>);

impl Deref for MemberRef {
    type Target = Member;

    fn deref(&self) -> &Member {
        &self.0
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemberRef {}

impl Hash for MemberRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.name, self.ty)
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Declaration of a member, consumed by
/// [`ObjectBuilder::member`](super::ObjectBuilder::member).
#[derive(Debug, Clone)]
pub struct MemberSpec {
    pub(crate) name: String,
    pub(crate) ty: Ty,
    pub(crate) kind: MemberKind,
    pub(crate) is_static: bool,
    pub(crate) readable: bool,
    pub(crate) writable: bool,
    pub(crate) initializer: Initializer,
}

impl MemberSpec {
    pub fn field(name: &str, ty: &Ty) -> Self {
        Self::new(name, ty, MemberKind::Field)
    }

    pub fn property(name: &str, ty: &Ty) -> Self {
        Self::new(name, ty, MemberKind::Property)
    }

    fn new(name: &str, ty: &Ty, kind: MemberKind) -> Self {
        MemberSpec {
            name: name.to_string(),
            ty: ty.clone(),
            kind,
            is_static: false,
            readable: true,
            writable: true,
            initializer: Initializer::Zero,
        }
    }

    /// Getter only.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Setter only.
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Fill the member with a fresh instance when the owner is constructed.
    pub fn constructed(mut self) -> Self {
        self.initializer = Initializer::Construct;
        self
    }

    pub fn initial(mut self, value: Value) -> Self {
        self.initializer = Initializer::Constant(value);
        self
    }
}
