//! Host type model.
//!
//! Describes the shapes the mapper compiles against: builtin scalars,
//! interned constructed types (nullables and sequences) and nominal enums,
//! structs, classes and interfaces registered with a [`TypeManager`].

mod builder;
mod error;
mod manager;
mod member;
mod relations;
#[allow(clippy::module_inception)]
mod types;

#[cfg(test)]
mod manager_test;

pub use builder::{EnumBuilder, ObjectBuilder};
pub use error::TypeError;
pub use manager::TypeManager;
pub use member::{Initializer, Member, MemberKind, MemberRef, MemberSpec};
pub use types::{
    ConversionFn, ConversionKind, ConversionOp, DisplayFn, EnumDef, ObjectDef, SeqKind, Ty,
    TypeKind,
};
