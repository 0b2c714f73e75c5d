use thiserror::Error;

/// Errors raised while declaring types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("type `{name}` is already defined")]
    Redefined { name: String },

    #[error("type `{name}` was declared as {declared}, not as {requested}")]
    KindMismatch {
        name: String,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("member `{member}` is declared twice on `{owner}`")]
    DuplicateMember { owner: String, member: String },

    #[error("`{base}` cannot be a base of `{name}`: {reason}")]
    InvalidBase {
        name: String,
        base: String,
        reason: &'static str,
    },

    #[error("enum `{name}` needs an integral underlying type, found `{underlying}`")]
    InvalidUnderlying { name: String, underlying: String },
}
