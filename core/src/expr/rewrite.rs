use crate::expr::{Expr, ExprKind, Var};
use crate::types::MemberRef;

impl Expr {
    /// Rebuild this node with `f` applied to each direct child.
    pub fn map_children(self, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
        fn boxed(expr: Box<Expr>, f: &mut impl FnMut(Expr) -> Expr) -> Box<Expr> {
            Box::new(f(*expr))
        }

        let Expr { ty, kind } = self;
        let kind = match kind {
            ExprKind::Param { .. }
            | ExprKind::Local { .. }
            | ExprKind::Default
            | ExprKind::Constant(_)
            | ExprKind::New => kind,
            ExprKind::Member { target, member } => ExprKind::Member {
                target: boxed(target, f),
                member,
            },
            ExprKind::Convert { operand, op } => ExprKind::Convert {
                operand: boxed(operand, f),
                op,
            },
            ExprKind::TypeAs(operand) => ExprKind::TypeAs(boxed(operand, f)),
            ExprKind::Coalesce { value, fallback } => ExprKind::Coalesce {
                value: boxed(value, f),
                fallback: boxed(fallback, f),
            },
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => ExprKind::Conditional {
                test: boxed(test, f),
                then: boxed(then, f),
                otherwise: boxed(otherwise, f),
            },
            ExprKind::IsNull(operand) => ExprKind::IsNull(boxed(operand, f)),
            ExprKind::NewSeq(items) => ExprKind::NewSeq(items.into_iter().map(&mut *f).collect()),
            ExprKind::CollectSeq { source, cast } => ExprKind::CollectSeq {
                source: boxed(source, f),
                cast,
            },
            ExprKind::Call { func, args } => ExprKind::Call {
                func,
                args: args.into_iter().map(&mut *f).collect(),
            },
            ExprKind::Assign { place, value } => ExprKind::Assign {
                place: boxed(place, f),
                value: boxed(value, f),
            },
            ExprKind::Block { locals, body } => ExprKind::Block {
                locals,
                body: body.into_iter().map(&mut *f).collect(),
            },
        };
        Expr { ty, kind }
    }

    pub fn for_each_child(&self, f: &mut impl FnMut(&Expr)) {
        match &self.kind {
            ExprKind::Param { .. }
            | ExprKind::Local { .. }
            | ExprKind::Default
            | ExprKind::Constant(_)
            | ExprKind::New => {}
            ExprKind::Member { target, .. } => f(target),
            ExprKind::Convert { operand, .. } => f(operand),
            ExprKind::TypeAs(operand) | ExprKind::IsNull(operand) => f(operand),
            ExprKind::Coalesce { value, fallback } => {
                f(value);
                f(fallback);
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => {
                f(test);
                f(then);
                f(otherwise);
            }
            ExprKind::CollectSeq { source, .. } => f(source),
            ExprKind::NewSeq(items) => items.iter().for_each(f),
            ExprKind::Call { args, .. } => args.iter().for_each(f),
            ExprKind::Assign { place, value } => {
                f(place);
                f(value);
            }
            ExprKind::Block { body, .. } => body.iter().for_each(f),
        }
    }

    /// Top-down rewrite: where `f` returns a replacement the subtree is
    /// replaced and not visited further.
    pub fn rewrite(self, f: &mut impl FnMut(&Expr) -> Option<Expr>) -> Expr {
        match f(&self) {
            Some(replacement) => replacement,
            None => self.map_children(&mut |child| child.rewrite(&mut *f)),
        }
    }

    /// Substitute every reference to `var`.
    pub fn replace_var(self, var: Var, with: &Expr) -> Expr {
        self.rewrite(&mut |expr| (expr.variable() == Some(var)).then(|| with.clone()))
    }

    /// First parameter or local other than `allowed` that is referenced.
    pub(crate) fn references_other_than(&self, allowed: Var) -> Option<Var> {
        if let Some(var) = self.variable() {
            return (var != allowed).then_some(var);
        }
        let mut found = None;
        self.for_each_child(&mut |child| {
            if found.is_none() {
                found = child.references_other_than(allowed);
            }
        });
        found
    }

    /// Split a pure member access chain into its root variable expression and
    /// the members read from it, outermost last.
    pub fn member_chain(&self) -> Option<(&Expr, Vec<MemberRef>)> {
        let mut members = Vec::new();
        let mut current = self;
        while let ExprKind::Member { target, member } = &current.kind {
            members.push(member.clone());
            current = target;
        }
        if !current.is_variable() {
            return None;
        }
        members.reverse();
        Some((current, members))
    }
}
