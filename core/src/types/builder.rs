use std::sync::Arc;

use crate::types::member::{Member, MemberRef, MemberSpec};
use crate::types::types::{
    ConversionKind, ConversionOp, DisplayFn, EnumDef, ObjectBody, Ty, TypeKind,
};
use crate::types::{TypeError, TypeManager};
use crate::values::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    Class,
    Struct,
    Interface,
}

impl Flavor {
    pub(crate) fn of(ty: &Ty) -> Option<Flavor> {
        match ty.kind() {
            TypeKind::Class(_) => Some(Flavor::Class),
            TypeKind::Struct(_) => Some(Flavor::Struct),
            TypeKind::Interface(_) => Some(Flavor::Interface),
            _ => None,
        }
    }

    pub(crate) fn describe(self) -> &'static str {
        match self {
            Flavor::Class => "a class",
            Flavor::Struct => "a struct",
            Flavor::Interface => "an interface",
        }
    }
}

/// Collects the body of a struct, class or interface.
///
/// The type handle exists before `build` is called (see [`ObjectBuilder::ty`]),
/// so members may refer to the type being defined.
pub struct ObjectBuilder {
    ty: Ty,
    flavor: Flavor,
    members: Vec<MemberSpec>,
    base: Option<Ty>,
    interfaces: Vec<Ty>,
    default_ctor: bool,
    conversions: Vec<ConversionOp>,
    display: Option<DisplayFn>,
}

impl ObjectBuilder {
    pub(crate) fn new(ty: Ty, flavor: Flavor) -> Self {
        ObjectBuilder {
            ty,
            flavor,
            members: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            default_ctor: flavor != Flavor::Interface,
            conversions: Vec::new(),
            display: None,
        }
    }

    /// Handle of the type under construction.
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn field(self, name: &str, ty: &Ty) -> Self {
        self.member(MemberSpec::field(name, ty))
    }

    pub fn property(self, name: &str, ty: &Ty) -> Self {
        self.member(MemberSpec::property(name, ty))
    }

    pub fn member(mut self, spec: MemberSpec) -> Self {
        self.members.push(spec);
        self
    }

    pub fn base(mut self, base: &Ty) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn implements(mut self, interface: &Ty) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    pub fn without_default_constructor(mut self) -> Self {
        self.default_ctor = false;
        self
    }

    pub fn implicit_conversion(
        mut self,
        from: &Ty,
        to: &Ty,
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.conversions
            .push(ConversionOp::new(ConversionKind::Implicit, from, to, func));
        self
    }

    pub fn explicit_conversion(
        mut self,
        from: &Ty,
        to: &Ty,
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.conversions
            .push(ConversionOp::new(ConversionKind::Explicit, from, to, func));
        self
    }

    /// Override the text produced when a value of this type is converted to
    /// a string.
    pub fn display(mut self, func: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.display = Some(Arc::new(func));
        self
    }

    pub fn build(self) -> Result<Ty, TypeError> {
        let Some(def) = self.ty.object_def() else {
            return Err(TypeError::KindMismatch {
                name: self.ty.to_string(),
                declared: "a non-object type",
                requested: self.flavor.describe(),
            });
        };
        let name = def.name().to_string();

        let mut members: Vec<MemberRef> = Vec::new();
        if let Some(base) = &self.base {
            let reason = match (self.flavor, base.kind()) {
                (Flavor::Class, TypeKind::Class(base_def)) if !base_def.is_defined() => {
                    Some("base class is not defined yet")
                }
                (Flavor::Class, TypeKind::Class(_)) => None,
                (Flavor::Class, _) => Some("only classes can be inherited"),
                _ => Some("only classes can have a base class"),
            };
            if let Some(reason) = reason {
                return Err(TypeError::InvalidBase {
                    name,
                    base: base.to_string(),
                    reason,
                });
            }
            members.extend(base.members().iter().cloned());
        }

        for spec in self.members {
            if members.iter().any(|member| member.name() == spec.name) {
                return Err(TypeError::DuplicateMember {
                    owner: name,
                    member: spec.name,
                });
            }
            let slot = members.len();
            members.push(MemberRef(Arc::new(Member {
                name: spec.name,
                owner: name.clone(),
                ty: spec.ty,
                kind: spec.kind,
                is_static: spec.is_static,
                readable: spec.readable,
                writable: spec.writable,
                initializer: spec.initializer,
                slot,
            })));
        }

        let body = ObjectBody {
            members,
            base: self.base,
            interfaces: self.interfaces,
            default_ctor: self.default_ctor,
            conversions: self.conversions,
            display: self.display,
        };
        if def.body.set(body).is_err() {
            return Err(TypeError::Redefined { name });
        }

        tracing::trace!(ty = %self.ty, "Type defined");
        Ok(self.ty)
    }
}

/// Collects the variants of an enum type.
pub struct EnumBuilder<'m> {
    manager: &'m TypeManager,
    name: String,
    underlying: Ty,
    variants: Vec<(String, i64)>,
    flags: bool,
}

impl<'m> EnumBuilder<'m> {
    pub(crate) fn new(manager: &'m TypeManager, name: &str, underlying: &Ty) -> Self {
        EnumBuilder {
            manager,
            name: name.to_string(),
            underlying: underlying.clone(),
            variants: Vec::new(),
            flags: false,
        }
    }

    pub fn variant(mut self, name: &str, value: i64) -> Self {
        self.variants.push((name.to_string(), value));
        self
    }

    /// Mark as a bit-flags enum; parsing and formatting then accept
    /// comma-separated variant lists.
    pub fn flags(mut self) -> Self {
        self.flags = true;
        self
    }

    pub fn build(self) -> Result<Ty, TypeError> {
        if !self.underlying.is_integral() {
            return Err(TypeError::InvalidUnderlying {
                name: self.name,
                underlying: self.underlying.to_string(),
            });
        }
        for (index, (variant, _)) in self.variants.iter().enumerate() {
            if self.variants[..index].iter().any(|(seen, _)| seen == variant) {
                return Err(TypeError::DuplicateMember {
                    owner: self.name.clone(),
                    member: variant.clone(),
                });
            }
        }
        self.manager.register(
            &self.name,
            TypeKind::Enum(EnumDef {
                name: self.name.clone(),
                underlying: self.underlying,
                variants: self.variants,
                flags: self.flags,
            }),
        )
    }
}

