//! Lowering of expressions to nested closures.
//!
//! Every node becomes a boxed closure over its lowered children. Variables
//! live in a flat [`Frame`] indexed by [`Var`](crate::expr::Var).

use crate::compiler::{CompileError, RuntimeError};
use crate::expr::{Callee, ConvertOp, Expr, ExprKind};
use crate::types::{MemberRef, Ty};
use crate::values::{
    ConversionError, Value, change_type, integer_bits, parse_enum, to_display_string,
    wrapping_integer,
};

pub(crate) type Thunk = Box<dyn Fn(&mut Frame) -> Result<Value, RuntimeError> + Send + Sync>;
type Store = Box<dyn Fn(&mut Frame, Value) -> Result<(), RuntimeError> + Send + Sync>;
type Apply = Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

pub(crate) struct Frame {
    slots: Vec<Value>,
}

impl Frame {
    pub(crate) fn new(size: usize) -> Self {
        Frame {
            slots: vec![Value::Null; size],
        }
    }

    fn get(&self, index: usize) -> Value {
        self.slots.get(index).cloned().unwrap_or(Value::Null)
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = value;
        }
    }
}

/// Highest variable index referenced or declared in `expr`.
pub(crate) fn max_var(expr: &Expr, max: &mut usize) {
    if let Some(var) = expr.variable() {
        *max = (*max).max(var.index());
    }
    if let ExprKind::Block { locals, .. } = expr.kind() {
        for local in locals {
            *max = (*max).max(local.var.index());
        }
    }
    expr.for_each_child(&mut |child| max_var(child, max));
}

fn invalid_cast(value: &Value, to: &Ty) -> RuntimeError {
    ConversionError::InvalidCast {
        from: value.type_name(),
        to: to.to_string(),
    }
    .into()
}

pub(crate) fn lower(expr: &Expr) -> Result<Thunk, CompileError> {
    let ty = expr.ty().clone();
    Ok(match expr.kind() {
        ExprKind::Param { var, .. } | ExprKind::Local { var, .. } => {
            let index = var.index();
            Box::new(move |frame| Ok(frame.get(index)))
        }
        ExprKind::Default => {
            let zero = Value::zero(&ty);
            Box::new(move |_| Ok(zero.clone()))
        }
        ExprKind::Constant(value) => {
            let value = value.clone();
            Box::new(move |_| Ok(value.clone()))
        }
        ExprKind::Member { target, member } => {
            let target = lower(target)?;
            let member = member.clone();
            let zero = Value::zero(member.ty());
            // Reading through null yields the member's zero value.
            Box::new(move |frame| {
                let target = target(frame)?;
                Ok(read_member(&target, &member).unwrap_or_else(|| zero.clone()))
            })
        }
        ExprKind::Convert { operand, op } => {
            let operand = lower(operand)?;
            match op {
                ConvertOp::Upcast => operand,
                ConvertOp::Numeric => Box::new(move |frame| numeric_cast(operand(frame)?, &ty)),
                ConvertOp::Cast => Box::new(move |frame| {
                    let value = operand(frame)?;
                    if value.conforms_to(&ty) {
                        Ok(value)
                    } else {
                        Err(invalid_cast(&value, &ty))
                    }
                }),
            }
        }
        ExprKind::TypeAs(operand) => {
            let operand = lower(operand)?;
            Box::new(move |frame| {
                let value = operand(frame)?;
                Ok(if value.is_instance_of(&ty) {
                    value
                } else {
                    Value::Null
                })
            })
        }
        ExprKind::Coalesce { value, fallback } => {
            let value = lower(value)?;
            let fallback = lower(fallback)?;
            Box::new(move |frame| match value(frame)? {
                Value::Null => fallback(frame),
                value => Ok(value),
            })
        }
        ExprKind::Conditional {
            test,
            then,
            otherwise,
        } => {
            let test = lower(test)?;
            let then = lower(then)?;
            let otherwise = lower(otherwise)?;
            Box::new(move |frame| {
                if test(frame)?.as_bool() == Some(true) {
                    then(frame)
                } else {
                    otherwise(frame)
                }
            })
        }
        ExprKind::IsNull(operand) => {
            let operand = lower(operand)?;
            Box::new(move |frame| Ok(Value::Bool(operand(frame)?.is_null())))
        }
        ExprKind::New => Box::new(move |_| Ok(Value::construct(&ty))),
        ExprKind::NewSeq(items) => {
            let items = lower_all(items)?;
            Box::new(move |frame| Ok(Value::seq(&ty, eval_all(&items, frame)?)))
        }
        ExprKind::CollectSeq { source, cast } => {
            let source = lower(source)?;
            let cast = cast.clone();
            Box::new(move |frame| {
                let source = source(frame)?;
                if source.is_null() {
                    return Ok(Value::Null);
                }
                let items = source
                    .iter_items()
                    .ok_or_else(|| invalid_cast(&source, &ty))?;
                if let Some(elem) = &cast {
                    if let Some(item) = items.iter().find(|item| !item.conforms_to(elem)) {
                        return Err(invalid_cast(item, elem));
                    }
                }
                Ok(Value::seq(&ty, items))
            })
        }
        ExprKind::Call { func, args } => {
            let args = lower_all(args)?;
            let apply = callee(func, &ty);
            Box::new(move |frame| apply(&eval_all(&args, frame)?))
        }
        ExprKind::Assign { place, value } => {
            let store = lower_store(place)?;
            let value = lower(value)?;
            Box::new(move |frame| {
                let value = value(frame)?;
                store(frame, value.clone())?;
                Ok(value)
            })
        }
        ExprKind::Block { locals, body } => {
            let locals: Vec<(usize, Value)> = locals
                .iter()
                .map(|local| (local.var.index(), Value::zero(&local.ty)))
                .collect();
            let body = lower_all(body)?;
            Box::new(move |frame| {
                for (index, zero) in &locals {
                    frame.set(*index, zero.clone());
                }
                let mut last = Value::Null;
                for statement in &body {
                    last = statement(frame)?;
                }
                Ok(last)
            })
        }
    })
}

fn lower_all(exprs: &[Expr]) -> Result<Vec<Thunk>, CompileError> {
    exprs.iter().map(lower).collect()
}

fn eval_all(thunks: &[Thunk], frame: &mut Frame) -> Result<Vec<Value>, RuntimeError> {
    thunks.iter().map(|thunk| thunk(frame)).collect()
}

fn callee(func: &Callee, ty: &Ty) -> Apply {
    let ty = ty.clone();
    match func {
        Callee::ParseEnum => Box::new(move |args| {
            let bits = args
                .first()
                .and_then(Value::as_str)
                .zip(ty.as_enum())
                .and_then(|(text, def)| parse_enum(def, text));
            Ok(match bits {
                Some(bits) => Value::enumeration(&ty, bits),
                None => Value::zero(&ty),
            })
        }),
        Callee::ChangeType => Box::new(move |args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            Ok(change_type(&value, &ty)?)
        }),
        Callee::ToString => Box::new(|args| {
            Ok(args
                .first()
                .and_then(to_display_string)
                .map(Value::string)
                .unwrap_or(Value::Null))
        }),
        Callee::Operator(op) => {
            let op = op.clone();
            Box::new(move |args| {
                let value = args.first().cloned().unwrap_or(Value::Null);
                Ok(op.apply(&value))
            })
        }
        Callee::Host(host) => {
            let host = host.clone();
            Box::new(move |args| Ok(host.call(args)))
        }
    }
}

/// Enum to or from its underlying integer, keeping the bits.
fn numeric_cast(value: Value, to: &Ty) -> Result<Value, RuntimeError> {
    if value.is_null() {
        return Ok(Value::zero(to));
    }
    let bits = integer_bits(&value).ok_or_else(|| invalid_cast(&value, to))?;
    if to.is_enum() {
        return Ok(Value::enumeration(to, bits as i64));
    }
    wrapping_integer(bits, to).ok_or_else(|| invalid_cast(&value, to))
}

/// Slot of `member` in an instance whose runtime type is `ty`. Members read
/// through an interface are found by name.
fn slot_in(ty: &Ty, member: &MemberRef) -> Option<usize> {
    if ty.has_member(member) {
        Some(member.slot())
    } else {
        ty.find_member(member.name()).map(|found| found.slot())
    }
}

fn read_member(target: &Value, member: &MemberRef) -> Option<Value> {
    match target {
        Value::Struct(s) => s.fields.get(slot_in(&s.ty, member)?).cloned(),
        Value::Object(obj) => {
            let slot = slot_in(obj.ty(), member)?;
            obj.fields().get(slot).cloned()
        }
        _ => None,
    }
}

/// Write `value` at `path` below `target`. Struct members on the path are
/// updated in place. Returns false if the path runs into null.
fn store_path(target: &mut Value, path: &[MemberRef], value: Value) -> bool {
    let Some((member, rest)) = path.split_first() else {
        *target = value;
        return true;
    };
    match target {
        Value::Struct(s) => {
            let Some(slot) = slot_in(&s.ty, member) else {
                return false;
            };
            match s.fields.get_mut(slot) {
                Some(field) => store_path(field, rest, value),
                None => false,
            }
        }
        Value::Object(obj) => {
            let Some(slot) = slot_in(obj.ty(), member) else {
                return false;
            };
            let mut fields = obj.fields_mut();
            match fields.get_mut(slot) {
                Some(field) => store_path(field, rest, value),
                None => false,
            }
        }
        _ => false,
    }
}

/// Split an assignment target into a base and the members written below it.
///
/// Value-typed members are followed down to the variable or reference that
/// holds them, so a write to `local.inner.x` updates the copy in `local`.
fn lower_store(place: &Expr) -> Result<Store, CompileError> {
    let mut path = Vec::new();
    let mut base = place;
    while let ExprKind::Member { target, member } = base.kind() {
        path.push(member.clone());
        base = target;
        if base.is_variable() || base.ty().is_reference_type() {
            break;
        }
    }
    path.reverse();

    if let Some(var) = base.variable() {
        let index = var.index();
        if path.is_empty() {
            return Ok(Box::new(move |frame, value| {
                frame.set(index, value);
                Ok(())
            }));
        }
        if base.ty().is_value_type() {
            return Ok(Box::new(move |frame, value| {
                if let Some(slot) = frame.slots.get_mut(index) {
                    if !store_path(slot, &path, value) {
                        tracing::trace!(index, "Skipping write through null");
                    }
                }
                Ok(())
            }));
        }
    }

    if path.is_empty() || base.ty().is_value_type() {
        return Err(CompileError::NotAddressable {
            expr: place.to_string(),
        });
    }
    let base = lower(base)?;
    let described = place.to_string();
    Ok(Box::new(move |frame, value| {
        let mut target = base(frame)?;
        if !store_path(&mut target, &path, value) {
            tracing::trace!(place = %described, "Skipping write through null");
        }
        Ok(())
    }))
}
