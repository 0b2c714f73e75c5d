//! Root-level automatic member matching.

use crate::converters::ConverterChain;
use crate::mapping::OutputLocation;
use crate::types::{MemberRef, Ty};

/// Decides whether a source member feeds a target member.
pub type MatchPredicate = dyn Fn(&MemberRef, &MemberRef) -> bool + Send + Sync;

/// Same name, and the target type is assignable from the source type or the
/// chain can convert between them.
pub fn default_predicate(
    chain: &ConverterChain,
) -> impl Fn(&MemberRef, &MemberRef) -> bool + '_ {
    move |source, target| {
        source.name() == target.name()
            && !source.is_static()
            && (target.ty().is_assignable_from(source.ty())
                || chain.can_convert(source.ty(), target.ty()))
    }
}

/// Proposes `(target member, source member)` pairs: each writable instance
/// member of `target` is paired with the first readable instance member of
/// `source`, in declaration order, that satisfies `predicate`. Source members
/// named by a single-member path in `ignored` are never proposed.
pub fn auto_match(
    source: &Ty,
    target: &Ty,
    predicate: &dyn Fn(&MemberRef, &MemberRef) -> bool,
    ignored: &[OutputLocation],
) -> Vec<(MemberRef, MemberRef)> {
    let candidates: Vec<&MemberRef> = source
        .members()
        .iter()
        .filter(|member| member.is_readable() && !member.is_static())
        .filter(|member| {
            !ignored
                .iter()
                .any(|path| path.len() == 1 && path.last() == Some(*member))
        })
        .collect();

    target
        .members()
        .iter()
        .filter(|member| member.is_writable() && !member.is_static())
        .filter_map(|target_member| {
            candidates
                .iter()
                .find(|source_member| predicate(source_member, target_member))
                .map(|source_member| (target_member.clone(), (*source_member).clone()))
        })
        .collect()
}
