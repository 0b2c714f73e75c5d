use core::fmt;

use smallvec::SmallVec;

use crate::expr::{Expr, Var};
use crate::mapping::ConfigError;
use crate::types::{MemberRef, Ty};

/// Root-relative member path on the target type.
///
/// Equality is pointwise on the member descriptors, regardless of whether the
/// location was parsed from a string or taken from an accessor expression.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct OutputLocation(SmallVec<[MemberRef; 4]>);

impl OutputLocation {
    /// The empty path: the target value itself.
    pub fn root() -> Self {
        OutputLocation(SmallVec::new())
    }

    pub fn from_members(members: impl IntoIterator<Item = MemberRef>) -> Self {
        OutputLocation(members.into_iter().collect())
    }

    /// Resolve a dotted member path against `ty`. The empty string is the
    /// root.
    pub fn parse(ty: &Ty, path: &str) -> Result<Self, ConfigError> {
        let mut members = SmallVec::new();
        if path.is_empty() {
            return Ok(OutputLocation(members));
        }
        let mut current = ty.clone();
        let mut offset = 0;
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(ConfigError::EmptySegment {
                    path: path.to_string(),
                    offset,
                });
            }
            let member = current
                .find_member(segment)
                .ok_or_else(|| ConfigError::UnknownMember {
                    ty: current.to_string(),
                    name: segment.to_string(),
                    path: path.to_string(),
                    offset,
                })?;
            if member.is_static() {
                return Err(ConfigError::StaticMember {
                    ty: current.to_string(),
                    name: segment.to_string(),
                });
            }
            current = member.ty().clone();
            members.push(member);
            offset += segment.len() + 1;
        }
        Ok(OutputLocation(members))
    }

    /// The members read by a pure access chain on the parameter `root`.
    pub fn from_expr(expr: &Expr, root: Var, side: &'static str) -> Result<Self, ConfigError> {
        match expr.member_chain() {
            Some((base, members)) if base.variable() == Some(root) => {
                Ok(OutputLocation::from_members(members))
            }
            _ => Err(ConfigError::NotMemberChain {
                expr: expr.to_string(),
                side,
            }),
        }
    }

    pub fn members(&self) -> &[MemberRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&MemberRef> {
        self.0.last()
    }

    /// Type of the value at this location.
    pub fn ty(&self, root: &Ty) -> Ty {
        match self.last() {
            Some(member) => member.ty().clone(),
            None => root.clone(),
        }
    }

    /// Read this location starting from `base`.
    pub fn access(&self, base: Expr) -> Expr {
        self.0.iter().fold(base, |expr, member| expr.member(member))
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "(root)");
        }
        for (i, member) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", member.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
