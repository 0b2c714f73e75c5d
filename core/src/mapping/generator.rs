//! Mapping block generation.
//!
//! Walks the hierarchy of output locations and emits one block per node:
//! acquire the node's object, assign or create each child, recurse into
//! children that have nested bindings, then write value types back.

use crate::converters::ConverterChain;
use crate::expr::{Expr, Local, Var, VarAllocator};
use crate::mapping::hierarchy::{Hierarchy, NodeId};
use crate::mapping::optimizer::Hoisted;
use crate::mapping::{BindingTable, ConfigError, OutputLocation};
use crate::types::{Ty, TypeManager};

type Slot = (OutputLocation, Option<Expr>);

pub(crate) struct Generator<'a> {
    pub(crate) types: &'a TypeManager,
    pub(crate) chain: &'a ConverterChain,
    pub(crate) vars: &'a mut VarAllocator,
    /// Parameter the bound source expressions were written against.
    pub(crate) source_param: Var,
    /// Parameter of the compiled function.
    pub(crate) input: Expr,
    pub(crate) target: Ty,
    pub(crate) construct_missing: bool,
}

impl Generator<'_> {
    pub(crate) fn generate(
        mut self,
        bindings: BindingTable,
        hoisted: Vec<Hoisted>,
    ) -> Result<Expr, ConfigError> {
        let target = self.target.clone();
        let mut body: Vec<Expr> = hoisted
            .iter()
            .map(|h| {
                let definition = h.definition.clone().replace_var(self.source_param, &self.input);
                Expr::assign(Expr::local(&h.local), definition)
            })
            .collect();
        let locals: Vec<Local> = hoisted.into_iter().map(|h| h.local).collect();

        let result = if target.is_primitive() || target.is_enum() {
            // Nothing to assign into.
            match bindings.get(&OutputLocation::root()) {
                Some(expr) => self.convert_binding(expr, &target, &OutputLocation::root())?,
                None => Expr::default(&target),
            }
        } else {
            let tree: Hierarchy<Slot> = Hierarchy::build(
                bindings
                    .into_iter()
                    .map(|(location, expr)| (location, Some(expr))),
                |(location, _)| location.members(),
                |prefix| (OutputLocation::from_members(prefix.iter().cloned()), None),
            );
            let root = tree.root();
            if let Some(expr) = &tree.value(root).1 {
                if !tree.children(root).is_empty() && self.reads_input(expr, &locals) {
                    return Err(ConfigError::AliasedRoot {
                        expr: expr.to_string(),
                    });
                }
            }
            let access = match &tree.value(root).1 {
                Some(expr) => self.convert_binding(expr, &target, &OutputLocation::root())?,
                None if target.has_default_constructor() => Expr::construct(&target),
                None => {
                    return Err(ConfigError::NotConstructible {
                        ty: target.to_string(),
                    });
                }
            };
            self.scope(&tree, root, access)?
        };

        if locals.is_empty() {
            return Ok(result);
        }
        body.push(result);
        Ok(Expr::block(locals, body, &target))
    }

    fn scope(
        &mut self,
        tree: &Hierarchy<Slot>,
        node: NodeId,
        access: Expr,
    ) -> Result<Expr, ConfigError> {
        let ty = access.ty().clone();
        let (location, _) = tree.value(node);

        let mut locals = Vec::new();
        let mut body = Vec::new();
        let scope = if access.is_variable() {
            access.clone()
        } else {
            let name = match location.last() {
                Some(member) => format!("_{}", member.name()),
                None => "out".to_string(),
            };
            let local = Local {
                var: self.vars.fresh(),
                name: name.into(),
                ty: ty.clone(),
            };
            body.push(Expr::assign(Expr::local(&local), access.clone()));
            let expr = Expr::local(&local);
            locals.push(local);
            expr
        };

        for &child in tree.children(node) {
            let (child_location, binding) = tree.value(child);
            let Some(member) = child_location.last() else {
                continue;
            };
            let place = scope.clone().member(member);
            match binding {
                Some(expr) => {
                    if !member.is_writable() {
                        return Err(ConfigError::ReadOnlyMember {
                            path: child_location.to_string(),
                        });
                    }
                    let value = self.convert_binding(expr, member.ty(), child_location)?;
                    body.push(Expr::assign(place.clone(), value));
                }
                None if self.construct_missing
                    && member.is_writable()
                    && member.ty().is_reference_type()
                    && member.ty().has_default_constructor() =>
                {
                    // Keep a caller-populated object, create one otherwise.
                    let created = place.clone().coalesce(Expr::construct(member.ty()));
                    body.push(Expr::assign(place.clone(), created));
                }
                None => {}
            }

            if !tree.children(child).is_empty() {
                if !member.is_readable() {
                    return Err(ConfigError::WriteOnlyMember {
                        path: child_location.to_string(),
                    });
                }
                if member.ty().is_value_type() && !member.is_writable() {
                    return Err(ConfigError::ReadOnlyMember {
                        path: child_location.to_string(),
                    });
                }
                let nested = self.scope(tree, child, place)?;
                body.push(nested);
            }
        }

        // A value type was copied into the local: store it back. The root
        // has no storage of its own and yields the local instead.
        let nested = tree.parent(node).is_some();
        if ty.is_value_type() && nested && !access.is_variable() {
            body.push(Expr::assign(access, scope));
        } else {
            body.push(scope);
        }
        Ok(Expr::block(locals, body, &ty))
    }

    /// Whether `expr` evaluates to a reference held by the input: a member
    /// chain on the source parameter or on a hoisted access of it.
    fn reads_input(&self, expr: &Expr, hoisted: &[Local]) -> bool {
        if expr.ty().is_value_type() || self.target.is_value_type() {
            return false;
        }
        match expr.member_chain() {
            Some((root, _)) => root.variable().is_some_and(|var| {
                var == self.source_param || hoisted.iter().any(|local| local.var == var)
            }),
            None => false,
        }
    }

    fn convert_binding(
        &self,
        expr: &Expr,
        to: &Ty,
        location: &OutputLocation,
    ) -> Result<Expr, ConfigError> {
        let expr = expr.clone().replace_var(self.source_param, &self.input);
        if expr.ty() == to {
            return Ok(expr);
        }
        let from = expr.ty().clone();
        if let Some(converted) = self.chain.try_convert(self.types, expr.clone(), to) {
            return Ok(converted);
        }
        if to.is_assignable_from(&from) {
            return Ok(expr.upcast(to));
        }
        Err(ConfigError::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
            path: location.to_string(),
        })
    }
}
