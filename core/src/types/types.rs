use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use crate::types::member::MemberRef;
use crate::values::Value;

/// Handle to a type descriptor.
///
/// Builtin types are process-wide singletons; constructed types (nullable,
/// sequences) are interned by a [`TypeManager`](super::TypeManager) and
/// nominal types are unique per declaration. Equality is therefore identity.
#[derive(Clone)]
pub struct Ty(Arc<TypeKind>);

impl Ty {
    pub(crate) fn new(kind: TypeKind) -> Self {
        Ty(Arc::new(kind))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Ty {}

impl Hash for Ty {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

#[derive(Debug)]
pub enum TypeKind {
    // Primitives.
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,

    Str,

    // Roots of the hierarchy.
    Object,
    ValueType,
    EnumBase,

    // Constructed.
    Nullable(Ty),
    Seq(SeqKind, Ty),

    // Nominal.
    Enum(EnumDef),
    Struct(ObjectDef),
    Class(ObjectDef),
    Interface(ObjectDef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    Array,
    List,
    ListInterface,
    Set,
    SetInterface,
    Enumerable,
}

impl SeqKind {
    /// Whether values of this kind can be instantiated directly.
    pub fn is_concrete(self) -> bool {
        matches!(self, SeqKind::Array | SeqKind::List | SeqKind::Set)
    }
}

struct Builtins {
    bool_: Ty,
    char_: Ty,
    i8_: Ty,
    i16_: Ty,
    i32_: Ty,
    i64_: Ty,
    u8_: Ty,
    u16_: Ty,
    u32_: Ty,
    u64_: Ty,
    f32_: Ty,
    f64_: Ty,
    str_: Ty,
    object: Ty,
    value_type: Ty,
    enum_base: Ty,
}

static BUILTINS: Lazy<Builtins> = Lazy::new(|| Builtins {
    bool_: Ty::new(TypeKind::Bool),
    char_: Ty::new(TypeKind::Char),
    i8_: Ty::new(TypeKind::I8),
    i16_: Ty::new(TypeKind::I16),
    i32_: Ty::new(TypeKind::I32),
    i64_: Ty::new(TypeKind::I64),
    u8_: Ty::new(TypeKind::U8),
    u16_: Ty::new(TypeKind::U16),
    u32_: Ty::new(TypeKind::U32),
    u64_: Ty::new(TypeKind::U64),
    f32_: Ty::new(TypeKind::F32),
    f64_: Ty::new(TypeKind::F64),
    str_: Ty::new(TypeKind::Str),
    object: Ty::new(TypeKind::Object),
    value_type: Ty::new(TypeKind::ValueType),
    enum_base: Ty::new(TypeKind::EnumBase),
});

impl Ty {
    pub fn bool() -> Ty {
        BUILTINS.bool_.clone()
    }
    pub fn char() -> Ty {
        BUILTINS.char_.clone()
    }
    pub fn i8() -> Ty {
        BUILTINS.i8_.clone()
    }
    pub fn i16() -> Ty {
        BUILTINS.i16_.clone()
    }
    pub fn i32() -> Ty {
        BUILTINS.i32_.clone()
    }
    pub fn i64() -> Ty {
        BUILTINS.i64_.clone()
    }
    pub fn u8() -> Ty {
        BUILTINS.u8_.clone()
    }
    pub fn u16() -> Ty {
        BUILTINS.u16_.clone()
    }
    pub fn u32() -> Ty {
        BUILTINS.u32_.clone()
    }
    pub fn u64() -> Ty {
        BUILTINS.u64_.clone()
    }
    pub fn f32() -> Ty {
        BUILTINS.f32_.clone()
    }
    pub fn f64() -> Ty {
        BUILTINS.f64_.clone()
    }
    pub fn string() -> Ty {
        BUILTINS.str_.clone()
    }
    pub fn object() -> Ty {
        BUILTINS.object.clone()
    }
    pub fn value_type() -> Ty {
        BUILTINS.value_type.clone()
    }
    pub fn enum_base() -> Ty {
        BUILTINS.enum_base.clone()
    }
}

#[derive(Debug)]
pub struct EnumDef {
    pub(crate) name: String,
    pub(crate) underlying: Ty,
    pub(crate) variants: Vec<(String, i64)>,
    pub(crate) flags: bool,
}

impl EnumDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn underlying(&self) -> &Ty {
        &self.underlying
    }

    pub fn variants(&self) -> &[(String, i64)] {
        &self.variants
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    /// Case-insensitive variant lookup.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
            .map(|(_, bits)| *bits)
    }

    pub fn name_of(&self, bits: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, value)| *value == bits)
            .map(|(variant, _)| variant.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    Implicit,
    Explicit,
}

pub type ConversionFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
pub type DisplayFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// A user-declared conversion operator on a struct or class.
#[derive(Clone)]
pub struct ConversionOp {
    pub(crate) kind: ConversionKind,
    pub(crate) from: Ty,
    pub(crate) to: Ty,
    pub(crate) func: ConversionFn,
}

impl ConversionOp {
    pub fn new(
        kind: ConversionKind,
        from: &Ty,
        to: &Ty,
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        ConversionOp {
            kind,
            from: from.clone(),
            to: to.clone(),
            func: Arc::new(func),
        }
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn from(&self) -> &Ty {
        &self.from
    }

    pub fn to(&self) -> &Ty {
        &self.to
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.func)(value)
    }
}

impl fmt::Debug for ConversionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConversionKind::Implicit => "implicit",
            ConversionKind::Explicit => "explicit",
        };
        write!(f, "{}<{} -> {}>", kind, self.from, self.to)
    }
}

/// Struct, class and interface descriptor.
///
/// The body is filled in exactly once, which lets a type be declared before
/// its members refer to it.
pub struct ObjectDef {
    pub(crate) name: String,
    pub(crate) body: OnceCell<ObjectBody>,
}

pub(crate) struct ObjectBody {
    /// Inherited members come first, so slots of a base class stay valid in
    /// derived instances.
    pub(crate) members: Vec<MemberRef>,
    pub(crate) base: Option<Ty>,
    pub(crate) interfaces: Vec<Ty>,
    pub(crate) default_ctor: bool,
    pub(crate) conversions: Vec<ConversionOp>,
    pub(crate) display: Option<DisplayFn>,
}

impl ObjectDef {
    pub(crate) fn declared(name: &str) -> Self {
        ObjectDef {
            name: name.to_string(),
            body: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_defined(&self) -> bool {
        self.body.get().is_some()
    }

    pub fn members(&self) -> &[MemberRef] {
        match self.body.get() {
            Some(body) => &body.members,
            None => &[],
        }
    }

    pub fn base(&self) -> Option<&Ty> {
        self.body.get().and_then(|body| body.base.as_ref())
    }

    pub fn interfaces(&self) -> &[Ty] {
        match self.body.get() {
            Some(body) => &body.interfaces,
            None => &[],
        }
    }

    pub fn has_default_constructor(&self) -> bool {
        self.body.get().is_some_and(|body| body.default_ctor)
    }

    pub fn conversions(&self) -> &[ConversionOp] {
        match self.body.get() {
            Some(body) => &body.conversions,
            None => &[],
        }
    }

    pub(crate) fn display(&self) -> Option<&DisplayFn> {
        self.body.get().and_then(|body| body.display.as_ref())
    }
}

impl fmt::Debug for ObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDef")
            .field("name", &self.name)
            .field("members", &self.members())
            .finish()
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Char => write!(f, "char"),
            TypeKind::I8 => write!(f, "i8"),
            TypeKind::I16 => write!(f, "i16"),
            TypeKind::I32 => write!(f, "i32"),
            TypeKind::I64 => write!(f, "i64"),
            TypeKind::U8 => write!(f, "u8"),
            TypeKind::U16 => write!(f, "u16"),
            TypeKind::U32 => write!(f, "u32"),
            TypeKind::U64 => write!(f, "u64"),
            TypeKind::F32 => write!(f, "f32"),
            TypeKind::F64 => write!(f, "f64"),
            TypeKind::Str => write!(f, "string"),
            TypeKind::Object => write!(f, "object"),
            TypeKind::ValueType => write!(f, "ValueType"),
            TypeKind::EnumBase => write!(f, "Enum"),
            TypeKind::Nullable(inner) => write!(f, "{}?", inner),
            TypeKind::Seq(kind, elem) => match kind {
                SeqKind::Array => write!(f, "{}[]", elem),
                SeqKind::List => write!(f, "List<{}>", elem),
                SeqKind::ListInterface => write!(f, "IList<{}>", elem),
                SeqKind::Set => write!(f, "HashSet<{}>", elem),
                SeqKind::SetInterface => write!(f, "ISet<{}>", elem),
                SeqKind::Enumerable => write!(f, "IEnumerable<{}>", elem),
            },
            TypeKind::Enum(def) => write!(f, "{}", def.name),
            TypeKind::Struct(def) | TypeKind::Class(def) | TypeKind::Interface(def) => {
                write!(f, "{}", def.name)
            }
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
