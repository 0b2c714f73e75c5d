//! From bindings to a mapping program.
//!
//! Bindings pair an [`OutputLocation`] on the target with a source
//! expression. The optimizer hoists shared accesses, the hierarchy groups
//! locations by prefix and the generator turns the tree into one expression.

mod bindings;
mod error;
pub(crate) mod generator;
pub mod hierarchy;
mod location;
pub mod matcher;
pub(crate) mod optimizer;


pub use bindings::BindingTable;
pub use error::ConfigError;
pub use hierarchy::{Hierarchy, NodeId};
pub use location::OutputLocation;
pub use matcher::{MatchPredicate, auto_match, default_predicate};
pub use optimizer::Hoisted;
