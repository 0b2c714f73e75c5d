//! Compiles object-to-object mappings over a dynamic type model.
//!
//! Types are described with a [`TypeManager`](types::TypeManager). A
//! [`MapperBuilder`](api::MapperBuilder) pairs target member paths with
//! source expressions, the [`mapping`] passes turn those bindings into one
//! expression tree and the [`compiler`] lowers the tree into a reusable
//! program.

pub mod api;
pub mod compiler;
pub mod converters;
pub mod expr;
pub mod mapping;
pub mod types;
pub mod values;

pub use api::{Error, Mapper, MapperBuilder, MapperOptions, MapperRegistry};
pub use converters::{ConversionRule, ConverterChain};
pub use mapping::{ConfigError, OutputLocation};
pub use types::{Ty, TypeManager};
pub use values::Value;
