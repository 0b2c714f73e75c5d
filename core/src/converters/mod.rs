//! Type conversion rules.
//!
//! A [`ConverterChain`] is an ordered registry of [`ConversionRule`]s. The
//! first rule that accepts a (source, target) pair synthesizes the conversion
//! expression; later rules are never consulted for that pair.

mod chain;
mod scalar;
mod sequences;


pub use chain::ConverterChain;
pub use scalar::{
    BoxRule, ConvertibleToPrimitive, EnumUnderlying, FromNullable, OperatorRule, ParentClass,
    StringToEnum, ToNullable, ToStringRule, UnboxRule,
};
pub use sequences::{SeqShape, ToSequence};

use crate::expr::Expr;
use crate::types::{Ty, TypeManager};

/// Strategy for converting values of one type into another.
///
/// Rules are stateless. `convert` is only called for pairs `can_convert`
/// accepted, and the expression it returns has static type `to`.
pub trait ConversionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool;

    /// `None` if the rule does not apply after all.
    fn convert(&self, types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr>;
}
