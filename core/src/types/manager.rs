use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::types::builder::{EnumBuilder, Flavor, ObjectBuilder};
use crate::types::types::{ObjectDef, SeqKind, Ty, TypeKind};
use crate::types::TypeError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Constructed {
    Nullable(Ty),
    Seq(SeqKind, Ty),
}

/// Owns every constructed and nominal type of a mapping universe.
///
/// Constructed types are interned, so `manager.list(&t) == manager.list(&t)`.
/// Nominal types are registered by name; declaring a name twice with the same
/// flavor returns the existing handle so mutually recursive types can be
/// spelled in any order.
pub struct TypeManager {
    constructed: RwLock<HashMap<Constructed, Ty>>,
    named: RwLock<HashMap<String, Ty>>,
}

impl TypeManager {
    pub fn new() -> Self {
        TypeManager {
            constructed: RwLock::new(HashMap::new()),
            named: RwLock::new(HashMap::new()),
        }
    }

    fn intern(&self, key: Constructed) -> Ty {
        if let Some(ty) = self.constructed.read().get(&key) {
            return ty.clone();
        }
        let mut constructed = self.constructed.write();
        let kind = match &key {
            Constructed::Nullable(inner) => TypeKind::Nullable(inner.clone()),
            Constructed::Seq(kind, elem) => TypeKind::Seq(*kind, elem.clone()),
        };
        constructed
            .entry(key)
            .or_insert_with(|| Ty::new(kind))
            .clone()
    }

    // Factory methods for builtin types.
    pub fn bool(&self) -> Ty {
        Ty::bool()
    }
    pub fn char(&self) -> Ty {
        Ty::char()
    }
    pub fn i8(&self) -> Ty {
        Ty::i8()
    }
    pub fn i16(&self) -> Ty {
        Ty::i16()
    }
    pub fn i32(&self) -> Ty {
        Ty::i32()
    }
    pub fn i64(&self) -> Ty {
        Ty::i64()
    }
    pub fn u8(&self) -> Ty {
        Ty::u8()
    }
    pub fn u16(&self) -> Ty {
        Ty::u16()
    }
    pub fn u32(&self) -> Ty {
        Ty::u32()
    }
    pub fn u64(&self) -> Ty {
        Ty::u64()
    }
    pub fn f32(&self) -> Ty {
        Ty::f32()
    }
    pub fn f64(&self) -> Ty {
        Ty::f64()
    }
    pub fn string(&self) -> Ty {
        Ty::string()
    }
    pub fn object(&self) -> Ty {
        Ty::object()
    }

    /// `T?`. Reference types and types that are already nullable are
    /// returned unchanged.
    pub fn nullable(&self, inner: &Ty) -> Ty {
        if !inner.is_value_type() || inner.is_nullable() {
            return inner.clone();
        }
        self.intern(Constructed::Nullable(inner.clone()))
    }

    pub fn seq(&self, kind: SeqKind, elem: &Ty) -> Ty {
        self.intern(Constructed::Seq(kind, elem.clone()))
    }

    pub fn array(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::Array, elem)
    }

    pub fn list(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::List, elem)
    }

    pub fn ilist(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::ListInterface, elem)
    }

    pub fn set(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::Set, elem)
    }

    pub fn iset(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::SetInterface, elem)
    }

    pub fn enumerable(&self, elem: &Ty) -> Ty {
        self.seq(SeqKind::Enumerable, elem)
    }

    pub fn class(&self, name: &str) -> Result<ObjectBuilder, TypeError> {
        self.object_builder(name, Flavor::Class)
    }

    pub fn structure(&self, name: &str) -> Result<ObjectBuilder, TypeError> {
        self.object_builder(name, Flavor::Struct)
    }

    pub fn interface(&self, name: &str) -> Result<ObjectBuilder, TypeError> {
        self.object_builder(name, Flavor::Interface)
    }

    /// Reserve a class name so other types can refer to it before its body
    /// is built with [`TypeManager::class`].
    pub fn declare_class(&self, name: &str) -> Result<Ty, TypeError> {
        self.declare(name, Flavor::Class)
    }

    pub fn declare_struct(&self, name: &str) -> Result<Ty, TypeError> {
        self.declare(name, Flavor::Struct)
    }

    pub fn declare_interface(&self, name: &str) -> Result<Ty, TypeError> {
        self.declare(name, Flavor::Interface)
    }

    pub fn enumeration(&self, name: &str, underlying: &Ty) -> EnumBuilder<'_> {
        EnumBuilder::new(self, name, underlying)
    }

    pub fn lookup(&self, name: &str) -> Option<Ty> {
        self.named.read().get(name).cloned()
    }

    fn object_builder(&self, name: &str, flavor: Flavor) -> Result<ObjectBuilder, TypeError> {
        let ty = self.declare(name, flavor)?;
        if ty.object_def().is_some_and(ObjectDef::is_defined) {
            return Err(TypeError::Redefined {
                name: name.to_string(),
            });
        }
        Ok(ObjectBuilder::new(ty, flavor))
    }

    fn declare(&self, name: &str, flavor: Flavor) -> Result<Ty, TypeError> {
        let mut named = self.named.write();
        if let Some(existing) = named.get(name) {
            return match Flavor::of(existing) {
                Some(declared) if declared == flavor => Ok(existing.clone()),
                Some(declared) => Err(TypeError::KindMismatch {
                    name: name.to_string(),
                    declared: declared.describe(),
                    requested: flavor.describe(),
                }),
                None => Err(TypeError::KindMismatch {
                    name: name.to_string(),
                    declared: "an enum",
                    requested: flavor.describe(),
                }),
            };
        }
        let def = ObjectDef::declared(name);
        let ty = Ty::new(match flavor {
            Flavor::Class => TypeKind::Class(def),
            Flavor::Struct => TypeKind::Struct(def),
            Flavor::Interface => TypeKind::Interface(def),
        });
        named.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    pub(crate) fn register(&self, name: &str, kind: TypeKind) -> Result<Ty, TypeError> {
        let mut named = self.named.write();
        if named.contains_key(name) {
            return Err(TypeError::Redefined {
                name: name.to_string(),
            });
        }
        let ty = Ty::new(kind);
        named.insert(name.to_string(), ty.clone());
        tracing::trace!(ty = %ty, "Type registered");
        Ok(ty)
    }
}

impl Default for TypeManager {
    fn default() -> Self {
        Self::new()
    }
}
