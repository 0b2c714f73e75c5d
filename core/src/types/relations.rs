//! Queries over type descriptors: classification, members and
//! assignability.

use crate::types::member::MemberRef;
use crate::types::types::{EnumDef, ObjectDef, SeqKind, Ty, TypeKind};

impl Ty {
    /// Value types are copied on read: primitives, enums, structs and
    /// nullables.
    pub fn is_value_type(&self) -> bool {
        self.is_primitive()
            || matches!(
                self.kind(),
                TypeKind::Nullable(_) | TypeKind::Enum(_) | TypeKind::Struct(_)
            )
    }

    pub fn is_reference_type(&self) -> bool {
        !self.is_value_type()
    }

    /// Reference types that are not interfaces.
    pub fn is_class(&self) -> bool {
        match self.kind() {
            TypeKind::Str
            | TypeKind::Object
            | TypeKind::ValueType
            | TypeKind::EnumBase
            | TypeKind::Class(_) => true,
            TypeKind::Seq(kind, _) => kind.is_concrete(),
            _ => false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind(),
            TypeKind::Bool
                | TypeKind::Char
                | TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::U8
                | TypeKind::U16
                | TypeKind::U32
                | TypeKind::U64
                | TypeKind::F32
                | TypeKind::F64
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self.kind(),
            TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::U8
                | TypeKind::U16
                | TypeKind::U32
                | TypeKind::U64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.kind(), TypeKind::F32 | TypeKind::F64)
    }

    /// Types the host can convert between generically: primitives, strings
    /// and enums.
    pub fn is_convertible(&self) -> bool {
        self.is_primitive() || matches!(self.kind(), TypeKind::Str | TypeKind::Enum(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind(), TypeKind::Str)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind(), TypeKind::Object)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind(), TypeKind::Nullable(_))
    }

    /// `T` for `T?`.
    pub fn nullable_underlying(&self) -> Option<&Ty> {
        match self.kind() {
            TypeKind::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind(), TypeKind::Enum(_))
    }

    pub fn as_enum(&self) -> Option<&EnumDef> {
        match self.kind() {
            TypeKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// Struct, class or interface definition.
    pub fn object_def(&self) -> Option<&ObjectDef> {
        match self.kind() {
            TypeKind::Struct(def) | TypeKind::Class(def) | TypeKind::Interface(def) => Some(def),
            _ => None,
        }
    }

    pub fn seq_kind(&self) -> Option<(SeqKind, &Ty)> {
        match self.kind() {
            TypeKind::Seq(kind, elem) => Some((*kind, elem)),
            _ => None,
        }
    }

    /// Element type when values of this type can be iterated.
    pub fn iterable_element(&self) -> Option<Ty> {
        match self.kind() {
            TypeKind::Seq(_, elem) => Some(elem.clone()),
            TypeKind::Str => Some(Ty::char()),
            _ => None,
        }
    }

    pub fn members(&self) -> &[MemberRef] {
        match self.object_def() {
            Some(def) => def.members(),
            None => &[],
        }
    }

    pub fn find_member(&self, name: &str) -> Option<MemberRef> {
        self.members()
            .iter()
            .find(|member| member.name() == name)
            .cloned()
    }

    pub fn has_member(&self, member: &MemberRef) -> bool {
        self.members().iter().any(|candidate| candidate == member)
    }

    /// Whether `new T()` is available.
    pub fn has_default_constructor(&self) -> bool {
        match self.kind() {
            TypeKind::Class(def) => def.has_default_constructor(),
            TypeKind::Seq(kind, _) => matches!(kind, SeqKind::List | SeqKind::Set),
            TypeKind::Object => true,
            _ => self.is_value_type(),
        }
    }

    pub fn base_class(&self) -> Option<&Ty> {
        match self.kind() {
            TypeKind::Class(def) => def.base(),
            _ => None,
        }
    }

    /// Whether this type or one of its bases lists `interface`, directly or
    /// through an inherited interface.
    pub fn implements(&self, interface: &Ty) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(def) = ty.object_def() {
                if def
                    .interfaces()
                    .iter()
                    .any(|candidate| candidate == interface || candidate.implements(interface))
                {
                    return true;
                }
            }
            current = ty.base_class();
        }
        false
    }

    /// Whether a value of type `source` can be stored in a location of this
    /// type without conversion code.
    pub fn is_assignable_from(&self, source: &Ty) -> bool {
        if self == source {
            return true;
        }
        match self.kind() {
            TypeKind::Object => true,
            TypeKind::ValueType => source.is_value_type(),
            TypeKind::EnumBase => source.is_enum(),
            TypeKind::Nullable(inner) => inner == source,
            TypeKind::Class(_) => {
                let mut current = source.base_class();
                while let Some(base) = current {
                    if base == self {
                        return true;
                    }
                    current = base.base_class();
                }
                false
            }
            TypeKind::Interface(_) => source.implements(self),
            TypeKind::Seq(kind, elem) => match source.kind() {
                TypeKind::Seq(source_kind, source_elem) => {
                    seq_assignable(*kind, elem, *source_kind, source_elem)
                }
                TypeKind::Str => *kind == SeqKind::Enumerable && *elem == Ty::char(),
                _ => false,
            },
            _ => false,
        }
    }
}

fn seq_assignable(kind: SeqKind, elem: &Ty, source_kind: SeqKind, source_elem: &Ty) -> bool {
    // Element covariance only holds for references.
    let covariant =
        elem == source_elem || (source_elem.is_reference_type() && elem.is_assignable_from(source_elem));
    match kind {
        SeqKind::Enumerable => covariant,
        SeqKind::Array => source_kind == SeqKind::Array && covariant,
        SeqKind::ListInterface => {
            matches!(source_kind, SeqKind::Array | SeqKind::List) && elem == source_elem
        }
        SeqKind::SetInterface => source_kind == SeqKind::Set && elem == source_elem,
        SeqKind::List | SeqKind::Set => false,
    }
}
