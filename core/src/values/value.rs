use core::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use smallvec::SmallVec;

use crate::types::{Initializer, SeqKind, Ty, TypeKind};

/// A dynamically typed runtime value.
///
/// Structs have value semantics: cloning a `Value::Struct` copies its fields.
/// Objects and sequences are shared references with identity.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(Arc<str>),
    Enum(EnumValue),
    Struct(StructValue),
    Object(ObjRef),
    Seq(SeqRef),
}

#[derive(Clone, PartialEq)]
pub struct EnumValue {
    pub(crate) ty: Ty,
    pub(crate) bits: i64,
}

impl EnumValue {
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn bits(&self) -> i64 {
        self.bits
    }
}

#[derive(Clone, PartialEq)]
pub struct StructValue {
    pub(crate) ty: Ty,
    pub(crate) fields: Vec<Value>,
}

impl StructValue {
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let member = self.ty.find_member(name)?;
        self.fields.get(member.slot()).cloned()
    }

    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let Some(member) = self.ty.find_member(name) else {
            return false;
        };
        match self.fields.get_mut(member.slot()) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Vec<Value> {
        &mut self.fields
    }
}

struct ObjectCell {
    ty: Ty,
    fields: RwLock<Vec<Value>>,
}

/// Shared handle to a class instance.
#[derive(Clone)]
pub struct ObjRef(Arc<ObjectCell>);

impl ObjRef {
    pub(crate) fn new(ty: Ty, fields: Vec<Value>) -> Self {
        ObjRef(Arc::new(ObjectCell {
            ty,
            fields: RwLock::new(fields),
        }))
    }

    /// The runtime (most derived) type.
    pub fn ty(&self) -> &Ty {
        &self.0.ty
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let member = self.ty().find_member(name)?;
        self.0.fields.read().get(member.slot()).cloned()
    }

    pub fn set(&self, name: &str, value: Value) -> bool {
        let Some(member) = self.ty().find_member(name) else {
            return false;
        };
        match self.0.fields.write().get_mut(member.slot()) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn fields(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.fields.read()
    }

    pub(crate) fn fields_mut(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.0.fields.write()
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

struct SeqCell {
    ty: Ty,
    items: RwLock<Vec<Value>>,
}

/// Shared handle to an array, list, set or lazy sequence.
#[derive(Clone)]
pub struct SeqRef(Arc<SeqCell>);

impl SeqRef {
    /// Sets keep the first occurrence of equal items.
    pub fn new(ty: &Ty, items: Vec<Value>) -> Self {
        let items = match ty.seq_kind() {
            Some((SeqKind::Set | SeqKind::SetInterface, _)) => {
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                unique
            }
            _ => items,
        };
        SeqRef(Arc::new(SeqCell {
            ty: ty.clone(),
            items: RwLock::new(items),
        }))
    }

    pub fn ty(&self) -> &Ty {
        &self.0.ty
    }

    pub fn items(&self) -> Vec<Value> {
        self.0.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.0.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.read().get(index).cloned()
    }

    pub fn ptr_eq(&self, other: &SeqRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::Str(text.into())
    }

    pub fn enumeration(ty: &Ty, bits: i64) -> Value {
        Value::Enum(EnumValue {
            ty: ty.clone(),
            bits,
        })
    }

    /// Enum value by variant name.
    pub fn variant(ty: &Ty, name: &str) -> Option<Value> {
        let bits = ty.as_enum()?.value_of(name)?;
        Some(Value::enumeration(ty, bits))
    }

    pub fn seq(ty: &Ty, items: Vec<Value>) -> Value {
        Value::Seq(SeqRef::new(ty, items))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Any integral value, or the bits of an enum.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::U8(v) => Some(*v as i64),
            Value::U16(v) => Some(*v as i64),
            Value::U32(v) => Some(*v as i64),
            Value::U64(v) => Some(*v as i64),
            Value::Enum(e) => Some(e.bits),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqRef> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Reads a member of a struct or object by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Value::Struct(s) => s.get(name),
            Value::Object(obj) => obj.get(name),
            _ => None,
        }
    }

    /// The dynamic type, `None` for null.
    pub fn runtime_type(&self) -> Option<Ty> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => Ty::bool(),
            Value::Char(_) => Ty::char(),
            Value::I8(_) => Ty::i8(),
            Value::I16(_) => Ty::i16(),
            Value::I32(_) => Ty::i32(),
            Value::I64(_) => Ty::i64(),
            Value::U8(_) => Ty::u8(),
            Value::U16(_) => Ty::u16(),
            Value::U32(_) => Ty::u32(),
            Value::U64(_) => Ty::u64(),
            Value::F32(_) => Ty::f32(),
            Value::F64(_) => Ty::f64(),
            Value::Str(_) => Ty::string(),
            Value::Enum(e) => e.ty.clone(),
            Value::Struct(s) => s.ty.clone(),
            Value::Object(obj) => obj.ty().clone(),
            Value::Seq(seq) => seq.ty().clone(),
        })
    }

    /// Runtime type test. Null is never an instance; a value of `T` is an
    /// instance of `T?`.
    pub fn is_instance_of(&self, ty: &Ty) -> bool {
        match self.runtime_type() {
            Some(runtime) => ty.is_assignable_from(&runtime),
            None => false,
        }
    }

    /// Whether the value may be stored in a location of type `ty`.
    pub fn conforms_to(&self, ty: &Ty) -> bool {
        match self {
            Value::Null => ty.is_reference_type() || ty.is_nullable(),
            _ => self.is_instance_of(ty),
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self.runtime_type() {
            Some(ty) => ty.to_string(),
            None => "null".to_string(),
        }
    }

    /// Items of an iterable value: sequence items, or the chars of a string.
    pub(crate) fn iter_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Seq(seq) => Some(seq.items()),
            Value::Str(s) => Some(s.chars().map(Value::Char).collect()),
            _ => None,
        }
    }

    /// `default(T)`: zero for scalars, a zeroed struct, null otherwise.
    pub fn zero(ty: &Ty) -> Value {
        match ty.kind() {
            TypeKind::Bool => Value::Bool(false),
            TypeKind::Char => Value::Char('\0'),
            TypeKind::I8 => Value::I8(0),
            TypeKind::I16 => Value::I16(0),
            TypeKind::I32 => Value::I32(0),
            TypeKind::I64 => Value::I64(0),
            TypeKind::U8 => Value::U8(0),
            TypeKind::U16 => Value::U16(0),
            TypeKind::U32 => Value::U32(0),
            TypeKind::U64 => Value::U64(0),
            TypeKind::F32 => Value::F32(0.0),
            TypeKind::F64 => Value::F64(0.0),
            TypeKind::Enum(_) => Value::enumeration(ty, 0),
            TypeKind::Struct(def) => Value::Struct(StructValue {
                ty: ty.clone(),
                fields: def.members().iter().map(|m| Value::zero(m.ty())).collect(),
            }),
            _ => Value::Null,
        }
    }

    /// `new T()`: runs member initializers. Types without a default
    /// constructor produce their zero value.
    pub fn construct(ty: &Ty) -> Value {
        construct_guarded(ty, &mut SmallVec::new())
    }
}

// `stack` holds the types under construction so self-referential
// `Initializer::Construct` members terminate.
fn construct_guarded(ty: &Ty, stack: &mut SmallVec<[Ty; 4]>) -> Value {
    match ty.kind() {
        TypeKind::Struct(def) | TypeKind::Class(def) => {
            if stack.contains(ty) || !ty.has_default_constructor() {
                return Value::zero(ty);
            }
            stack.push(ty.clone());
            let fields: Vec<Value> = def
                .members()
                .iter()
                .map(|member| match member.initializer() {
                    Initializer::Zero => Value::zero(member.ty()),
                    Initializer::Construct => construct_guarded(member.ty(), stack),
                    Initializer::Constant(value) => value.clone(),
                })
                .collect();
            stack.pop();
            if matches!(ty.kind(), TypeKind::Struct(_)) {
                Value::Struct(StructValue {
                    ty: ty.clone(),
                    fields,
                })
            } else {
                Value::Object(ObjRef::new(ty.clone(), fields))
            }
        }
        TypeKind::Seq(kind, _) if kind.is_concrete() => Value::Seq(SeqRef::new(ty, Vec::new())),
        TypeKind::Object => Value::Object(ObjRef::new(ty.clone(), Vec::new())),
        _ => Value::zero(ty),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Seq(a), Value::Seq(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::I8(v) => write!(f, "{}i8", v),
            Value::I16(v) => write!(f, "{}i16", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}i64", v),
            Value::U8(v) => write!(f, "{}u8", v),
            Value::U16(v) => write!(f, "{}u16", v),
            Value::U32(v) => write!(f, "{}u32", v),
            Value::U64(v) => write!(f, "{}u64", v),
            Value::F32(v) => write!(f, "{:?}f32", v),
            Value::F64(v) => write!(f, "{:?}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Enum(e) => match e.ty.as_enum().and_then(|def| def.name_of(e.bits)) {
                Some(name) => write!(f, "{}::{}", e.ty, name),
                None => write!(f, "{}({})", e.ty, e.bits),
            },
            Value::Struct(s) => debug_fields(f, &s.ty, &s.fields),
            Value::Object(obj) => debug_fields(f, obj.ty(), &obj.fields()),
            Value::Seq(seq) => f.debug_list().entries(seq.items()).finish(),
        }
    }
}

fn debug_fields(f: &mut fmt::Formatter<'_>, ty: &Ty, fields: &[Value]) -> fmt::Result {
    let name = ty.to_string();
    let mut out = f.debug_struct(&name);
    for member in ty.members() {
        if let Some(value) = fields.get(member.slot()) {
            out.field(member.name(), value);
        }
    }
    out.finish()
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}
