use thiserror::Error;

/// Errors in a mapper's configuration, reported by the builder or by
/// `build()` before any function is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `offset` is the byte offset of `name` within `path`.
    #[error("type `{ty}` has no member `{name}`")]
    UnknownMember {
        ty: String,
        name: String,
        path: String,
        offset: usize,
    },

    #[error("empty member name in path `{path}`")]
    EmptySegment { path: String, offset: usize },

    #[error("member `{name}` of `{ty}` is static")]
    StaticMember { ty: String, name: String },

    #[error("`{expr}` is not a chain of member accesses on the {side} parameter")]
    NotMemberChain { expr: String, side: &'static str },

    #[error("`{expr}` refers to a variable that is not the source parameter")]
    ForeignVariable { expr: String },

    #[error("member `{path}` is not writable")]
    ReadOnlyMember { path: String },

    #[error("member `{path}` is not readable")]
    WriteOnlyMember { path: String },

    #[error("cannot convert `{from}` to `{to}` for `{path}`")]
    UnsupportedConversion {
        from: String,
        to: String,
        path: String,
    },

    /// The whole-target binding reads the input object itself, so member
    /// bindings on top of it would write into the caller's value.
    #[error("the target is bound to `{expr}`, an object of the input; member bindings would modify it")]
    AliasedRoot { expr: String },

    #[error("cannot construct `{ty}`: it has no default constructor")]
    NotConstructible { ty: String },
}
