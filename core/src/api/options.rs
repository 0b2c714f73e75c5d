//! Configuration options for building mappers.

/// Controls how a [`MapperBuilder`](crate::api::MapperBuilder) turns its
/// bindings into a mapping program.
///
/// # Example
///
/// ```
/// use remap_core::api::MapperOptions;
///
/// let options = MapperOptions {
///     hoist_shared_members: false,
///     ..MapperOptions::default()
/// };
/// assert!(options.construct_missing_nested);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperOptions {
    /// Evaluate member accesses shared by several bindings once, into a local.
    ///
    /// Default: true
    pub hoist_shared_members: bool,

    /// Create intermediate objects that are null when a nested binding routes
    /// through them, keeping existing ones.
    ///
    /// Default: true
    pub construct_missing_nested: bool,

    /// When nothing is bound explicitly and a conversion rule converts the
    /// whole source value to the target type, use that conversion instead of
    /// member-wise mapping.
    ///
    /// Default: true
    pub conversion_shortcut: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            hoist_shared_members: true,
            construct_missing_nested: true,
            conversion_shortcut: true,
        }
    }
}
