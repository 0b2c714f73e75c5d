//! Shared member access hoisting.
//!
//! A member access chain on the source parameter that occurs more than once
//! across all bound expressions is evaluated once into a local, and every
//! occurrence reads the local instead.

use hashbrown::HashMap;

use crate::expr::{Expr, ExprKind, Local, Var, VarAllocator};
use crate::mapping::BindingTable;
use crate::types::MemberRef;

/// A local introduced for a repeated access; `definition` reads from the
/// source parameter or from locals hoisted before it.
#[derive(Clone, Debug)]
pub struct Hoisted {
    pub local: Local,
    pub definition: Expr,
}

struct Candidate {
    expr: Expr,
    count: usize,
    first_seen: usize,
}

/// Collect every non-root prefix of member chains rooted at `source`.
fn count_chains(
    expr: &Expr,
    source: Var,
    counts: &mut HashMap<Vec<MemberRef>, Candidate>,
) {
    if let Some((root, members)) = expr.member_chain() {
        if root.variable() == Some(source) && !members.is_empty() {
            // Walk from the outermost access down to the first member.
            let mut node = expr;
            for depth in (1..=members.len()).rev() {
                let seen = counts.len();
                counts
                    .entry(members[..depth].to_vec())
                    .or_insert_with(|| Candidate {
                        expr: node.clone(),
                        count: 0,
                        first_seen: seen,
                    })
                    .count += 1;
                if let ExprKind::Member { target, .. } = node.kind() {
                    node = target;
                }
            }
            return;
        }
    }
    expr.for_each_child(&mut |child| count_chains(child, source, counts));
}

fn chain_key(expr: &Expr, source: Var) -> Option<Vec<MemberRef>> {
    let (root, members) = expr.member_chain()?;
    (root.variable() == Some(source) && !members.is_empty()).then_some(members)
}

/// Hoist repeated accesses out of `bindings`, rewriting them in place.
///
/// Locals are ordered by occurrence count (descending), then chain length
/// (so a prefix precedes its extensions), then first appearance.
pub(crate) fn hoist_shared_members(
    bindings: &mut BindingTable,
    source: Var,
    vars: &mut VarAllocator,
) -> Vec<Hoisted> {
    let mut counts: HashMap<Vec<MemberRef>, Candidate> = HashMap::new();
    for (_, expr) in bindings.iter() {
        count_chains(expr, source, &mut counts);
    }

    let mut shared: Vec<(Vec<MemberRef>, Candidate)> = counts
        .into_iter()
        .filter(|(_, candidate)| candidate.count > 1)
        .collect();
    if shared.is_empty() {
        return Vec::new();
    }
    shared.sort_by(|(a_key, a), (b_key, b)| {
        b.count
            .cmp(&a.count)
            .then(a_key.len().cmp(&b_key.len()))
            .then(a.first_seen.cmp(&b.first_seen))
    });

    let mut replacements: HashMap<Vec<MemberRef>, Expr> = HashMap::new();
    let mut hoisted = Vec::with_capacity(shared.len());
    for (key, candidate) in shared {
        // Rewrite below the root so the definition reads earlier locals.
        let definition = candidate
            .expr
            .clone()
            .map_children(&mut |child| replace_chains(child, source, &replacements));
        let last = key.last().map(|member| member.name().to_string()).unwrap_or_default();
        let local = Local {
            var: vars.fresh(),
            name: format!("_{}{}", last, hoisted.len()).into(),
            ty: definition.ty().clone(),
        };
        tracing::trace!(local = %local.name, access = %candidate.expr, "Hoisting shared member");
        replacements.insert(key, Expr::local(&local));
        hoisted.push(Hoisted { local, definition });
    }

    for expr in bindings.exprs_mut() {
        *expr = replace_chains(expr.clone(), source, &replacements);
    }
    hoisted
}

fn replace_chains(expr: Expr, source: Var, replacements: &HashMap<Vec<MemberRef>, Expr>) -> Expr {
    expr.rewrite(&mut |node| {
        chain_key(node, source).and_then(|key| replacements.get(&key).cloned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::OutputLocation;
    use crate::types::{Ty, TypeManager};
    use pretty_assertions::assert_eq;

    struct Fixture {
        source: Ty,
        target: Ty,
    }

    fn fixture(manager: &TypeManager) -> Fixture {
        let c = manager
            .class("C")
            .unwrap()
            .property("Value", &manager.i32())
            .property("Other", &manager.i32())
            .build()
            .unwrap();
        let b = manager.class("B").unwrap().property("C", &c).build().unwrap();
        let a = manager.class("A").unwrap().property("B", &b).build().unwrap();
        let source = manager.class("Source").unwrap().property("A", &a).build().unwrap();
        let target = manager
            .class("Target")
            .unwrap()
            .property("First", &manager.i32())
            .property("Second", &manager.i32())
            .property("Third", &manager.i32())
            .build()
            .unwrap();
        Fixture { source, target }
    }

    fn path(src: &Expr, names: &[&str]) -> Expr {
        names
            .iter()
            .fold(src.clone(), |expr, name| expr.field(name).unwrap())
    }

    #[test]
    fn test_shared_prefixes_are_hoisted_once() {
        let manager = TypeManager::new();
        let fx = fixture(&manager);
        let src = Expr::param(Var(0), "src", &fx.source);

        let mut bindings = BindingTable::new();
        bindings.insert(
            OutputLocation::parse(&fx.target, "First").unwrap(),
            path(&src, &["A", "B", "C", "Value"]),
        );
        bindings.insert(
            OutputLocation::parse(&fx.target, "Second").unwrap(),
            path(&src, &["A", "B", "C", "Other"]),
        );

        let mut vars = VarAllocator::starting_at(3);
        let hoisted = hoist_shared_members(&mut bindings, Var(0), &mut vars);

        let definitions: Vec<_> = hoisted
            .iter()
            .map(|h| format!("{} = {}", h.local.name, h.definition))
            .collect();
        assert_eq!(
            definitions,
            vec!["_A0 = src.A", "_B1 = _A0.B", "_C2 = _B1.C"]
        );
        let rewritten: Vec<_> = bindings.iter().map(|(_, e)| e.to_string()).collect();
        assert_eq!(rewritten, vec!["_C2.Value", "_C2.Other"]);
    }

    #[test]
    fn test_count_orders_locals() {
        let manager = TypeManager::new();
        let fx = fixture(&manager);
        let src = Expr::param(Var(0), "src", &fx.source);

        let mut bindings = BindingTable::new();
        bindings.insert(
            OutputLocation::parse(&fx.target, "First").unwrap(),
            path(&src, &["A", "B", "C", "Value"]),
        );
        bindings.insert(
            OutputLocation::parse(&fx.target, "Second").unwrap(),
            path(&src, &["A", "B", "C", "Value"]),
        );
        bindings.insert(
            OutputLocation::parse(&fx.target, "Third").unwrap(),
            Expr::host_call(
                "sum",
                vec![path(&src, &["A", "B", "C", "Other"]), Expr::default(&manager.i32())],
                &manager.i32(),
                |args| args[0].clone(),
            ),
        );

        let mut vars = VarAllocator::starting_at(3);
        let hoisted = hoist_shared_members(&mut bindings, Var(0), &mut vars);

        let names: Vec<_> = hoisted.iter().map(|h| h.local.name.to_string()).collect();
        assert_eq!(names, vec!["_A0", "_B1", "_C2", "_Value3"]);
        let rewritten: Vec<_> = bindings.iter().map(|(_, e)| e.to_string()).collect();
        assert_eq!(
            rewritten,
            vec!["_Value3", "_Value3", "sum(_C2.Other, default(i32))"]
        );
    }

    #[test]
    fn test_nothing_shared() {
        let manager = TypeManager::new();
        let fx = fixture(&manager);
        let src = Expr::param(Var(0), "src", &fx.source);

        let mut bindings = BindingTable::new();
        bindings.insert(
            OutputLocation::parse(&fx.target, "First").unwrap(),
            path(&src, &["A", "B", "C", "Value"]),
        );

        let mut vars = VarAllocator::starting_at(3);
        assert!(hoist_shared_members(&mut bindings, Var(0), &mut vars).is_empty());
        assert_eq!(
            bindings.iter().next().map(|(_, e)| e.to_string()),
            Some("src.A.B.C.Value".to_string())
        );
    }
}
