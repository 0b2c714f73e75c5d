//! Rules between single values: nullability, boxing, enums, operators,
//! strings and primitives.

use crate::converters::ConversionRule;
use crate::expr::{Callee, ConvertOp, Expr};
use crate::types::{ConversionKind, ConversionOp, Ty, TypeKind, TypeManager};

fn is_value_type_base(ty: &Ty) -> bool {
    matches!(ty.kind(), TypeKind::Object | TypeKind::ValueType)
}

fn is_enum_base(ty: &Ty) -> bool {
    matches!(ty.kind(), TypeKind::EnumBase)
}

fn is_enum_or_nullable_enum(ty: &Ty) -> bool {
    ty.is_enum() || ty.nullable_underlying().is_some_and(Ty::is_enum)
}

/// `T?` to `T`: `x ?? default(T)`.
#[derive(Debug, Clone, Copy)]
pub struct FromNullable;

impl ConversionRule for FromNullable {
    fn name(&self) -> &'static str {
        "FromNullable"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from.nullable_underlying() == Some(to)
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(expr.coalesce(Expr::default(to)))
    }
}

/// `T` to `T?`.
#[derive(Debug, Clone, Copy)]
pub struct ToNullable;

impl ConversionRule for ToNullable {
    fn name(&self) -> &'static str {
        "ToNullable"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        to.nullable_underlying() == Some(from)
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(expr.convert(ConvertOp::Upcast, to))
    }
}

/// Value type to `object`/`ValueType`, enum (or nullable enum) to `Enum`.
#[derive(Debug, Clone, Copy)]
pub struct BoxRule;

impl ConversionRule for BoxRule {
    fn name(&self) -> &'static str {
        "Box"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        (from.is_value_type() && is_value_type_base(to))
            || (is_enum_base(to) && is_enum_or_nullable_enum(from))
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(expr.convert(ConvertOp::Upcast, to))
    }
}

/// The reverse of [`BoxRule`]. A non-nullable target reads
/// `(x as T?) ?? default(T)`, so a mismatched box yields zero.
#[derive(Debug, Clone, Copy)]
pub struct UnboxRule;

impl ConversionRule for UnboxRule {
    fn name(&self) -> &'static str {
        "Unbox"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        (to.is_value_type() && is_value_type_base(from))
            || (is_enum_base(from) && is_enum_or_nullable_enum(to))
    }

    fn convert(&self, types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        if to.is_nullable() {
            return Some(expr.type_as(to));
        }
        let nullable = types.nullable(to);
        Some(expr.type_as(&nullable).coalesce(Expr::default(to)))
    }
}

/// Enum to its underlying integer and back.
#[derive(Debug, Clone, Copy)]
pub struct EnumUnderlying;

impl ConversionRule for EnumUnderlying {
    fn name(&self) -> &'static str {
        "EnumUnderlying"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from.as_enum().is_some_and(|def| def.underlying() == to)
            || to.as_enum().is_some_and(|def| def.underlying() == from)
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(expr.convert(ConvertOp::Numeric, to))
    }
}

/// A user-declared conversion operator on either type with exactly the
/// signature `from -> to`.
#[derive(Debug, Clone, Copy)]
pub struct OperatorRule(pub ConversionKind);

impl OperatorRule {
    fn find(&self, from: &Ty, to: &Ty) -> Option<ConversionOp> {
        [from, to]
            .into_iter()
            .filter_map(Ty::object_def)
            .flat_map(|def| def.conversions())
            .find(|op| op.kind() == self.0 && op.from() == from && op.to() == to)
            .cloned()
    }
}

impl ConversionRule for OperatorRule {
    fn name(&self) -> &'static str {
        match self.0 {
            ConversionKind::Implicit => "ImplicitOperator",
            ConversionKind::Explicit => "ExplicitOperator",
        }
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        self.find(from, to).is_some()
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        let op = self.find(expr.ty(), to)?;
        Some(Expr::call(Callee::Operator(op), vec![expr], to))
    }
}

/// Case-insensitive parse; unparsable text yields the enum's zero value.
#[derive(Debug, Clone, Copy)]
pub struct StringToEnum;

impl ConversionRule for StringToEnum {
    fn name(&self) -> &'static str {
        "StringToEnum"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from.is_string() && to.is_enum()
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(Expr::call(Callee::ParseEnum, vec![expr], to))
    }
}

/// Primitive, string or enum to any primitive, through the host's generic
/// scalar conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertibleToPrimitive;

impl ConversionRule for ConvertibleToPrimitive {
    fn name(&self) -> &'static str {
        "ConvertibleToPrimitive"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from.is_convertible() && to.is_primitive()
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(Expr::call(Callee::ChangeType, vec![expr], to))
    }
}

/// Anything but a string to a string. A null source gives a null string.
#[derive(Debug, Clone, Copy)]
pub struct ToStringRule;

impl ConversionRule for ToStringRule {
    fn name(&self) -> &'static str {
        "ToString"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        !from.is_string() && to.is_string()
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        let nullable = expr.ty().is_reference_type() || expr.ty().is_nullable();
        let call = Expr::call(Callee::ToString, vec![expr.clone()], to);
        if !nullable {
            return Some(call);
        }
        Some(Expr::conditional(expr.is_null(), Expr::default(to), call))
    }
}

/// Class to one of its bases or interfaces, keeping identity.
#[derive(Debug, Clone, Copy)]
pub struct ParentClass;

impl ConversionRule for ParentClass {
    fn name(&self) -> &'static str {
        "ParentClass"
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        from.is_class() && to.is_assignable_from(from)
    }

    fn convert(&self, _types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        Some(expr.upcast(to))
    }
}
