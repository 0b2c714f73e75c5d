//! Rules producing containers from a single item or from another iterable.

use crate::converters::ConversionRule;
use crate::expr::{ConvertOp, Expr};
use crate::types::{SeqKind, Ty, TypeManager};

/// Container family a [`ToSequence`] rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqShape {
    /// `T[]`.
    Array,
    /// `List<T>` and `IList<T>`.
    List,
    /// `HashSet<T>` and `ISet<T>`.
    Set,
    /// `IEnumerable<T>`.
    Enumerable,
}

impl SeqShape {
    fn accepts(self, kind: SeqKind) -> bool {
        match self {
            SeqShape::Array => kind == SeqKind::Array,
            SeqShape::List => matches!(kind, SeqKind::List | SeqKind::ListInterface),
            SeqShape::Set => matches!(kind, SeqKind::Set | SeqKind::SetInterface),
            SeqShape::Enumerable => kind == SeqKind::Enumerable,
        }
    }

    /// Concrete container the items are materialized into.
    fn concrete(self, types: &TypeManager, elem: &Ty) -> Ty {
        match self {
            SeqShape::Array | SeqShape::Enumerable => types.array(elem),
            SeqShape::List => types.list(elem),
            SeqShape::Set => types.set(elem),
        }
    }
}

/// Single item or iterable to a container of the given shape.
///
/// A source that is not iterable, or whose items do not fit the target
/// element while the source itself does, is one item and becomes a
/// one-element container. An iterable is copied into a fresh container, with each item
/// checked when the element types are not assignable. An `IEnumerable<T>`
/// target accepts an assignable iterable as is, without a copy.
#[derive(Debug, Clone, Copy)]
pub struct ToSequence(pub SeqShape);

/// How the source feeds the container.
enum Feed {
    /// Copy the items of an iterable with this element type.
    Items(Ty),
    /// Wrap the source as the only item.
    Single,
}

impl ToSequence {
    fn target_element<'t>(&self, to: &'t Ty) -> Option<&'t Ty> {
        to.seq_kind()
            .filter(|(kind, _)| self.0.accepts(*kind))
            .map(|(_, elem)| elem)
    }

    /// An iterable whose items do not fit, such as a `string` bound for a
    /// `List<string>`, is a single item when the source itself fits.
    fn feed(from: &Ty, target_elem: &Ty) -> Option<Feed> {
        let fits = |ty: &Ty| ty.is_object() || target_elem.is_assignable_from(ty);
        match from.iterable_element() {
            Some(elem) if fits(&elem) => Some(Feed::Items(elem)),
            Some(_) if target_elem.is_assignable_from(from) => Some(Feed::Single),
            Some(_) => None,
            None => fits(from).then_some(Feed::Single),
        }
    }
}

impl ConversionRule for ToSequence {
    fn name(&self) -> &'static str {
        match self.0 {
            SeqShape::Array => "ToArray",
            SeqShape::List => "ToList",
            SeqShape::Set => "ToSet",
            SeqShape::Enumerable => "ToEnumerable",
        }
    }

    fn can_convert(&self, from: &Ty, to: &Ty) -> bool {
        let Some(target_elem) = self.target_element(to) else {
            return false;
        };
        Self::feed(from, target_elem).is_some()
    }

    fn convert(&self, types: &TypeManager, expr: Expr, to: &Ty) -> Option<Expr> {
        let elem = self.target_element(to)?.clone();
        let concrete = self.0.concrete(types, &elem);

        let Feed::Items(source_elem) = Self::feed(expr.ty(), &elem)? else {
            let item = if elem.is_assignable_from(expr.ty()) {
                expr.upcast(&elem)
            } else {
                expr.convert(ConvertOp::Cast, &elem)
            };
            return Some(Expr::new_seq(&concrete, vec![item]).upcast(to));
        };

        if self.0 == SeqShape::Enumerable && to.is_assignable_from(expr.ty()) {
            return Some(expr.upcast(to));
        }
        let cast = (!elem.is_assignable_from(&source_elem)).then(|| elem.clone());
        Some(expr.collect_seq(&concrete, cast).upcast(to))
    }
}
