//! Public API for building and running mappers.
//!
//! A [`MapperBuilder`] collects bindings for one (source, target) pair and
//! compiles them into a [`Mapper`]. A [`MapperRegistry`] shares converters and
//! options across builders and caches one auto-bound mapper per pair.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use remap_core::api::MapperRegistry;
//! use remap_core::types::TypeManager;
//! use remap_core::values::Value;
//!
//! let types = Arc::new(TypeManager::new());
//! let order = types.class("Order").unwrap()
//!     .property("Count", &types.i32())
//!     .build().unwrap();
//! let summary = types.class("Summary").unwrap()
//!     .property("Count", &types.string())
//!     .build().unwrap();
//!
//! let registry = MapperRegistry::new(types.clone());
//! let mapper = registry.default_mapper(&order, &summary).unwrap();
//!
//! let input = Value::construct(&order);
//! input.as_object().unwrap().set("Count", Value::from(7));
//! let output = mapper.map(&input).unwrap();
//! assert_eq!(output.get("Count"), Some(Value::from("7")));
//! ```

mod builder;
mod error;
mod mapper;
mod options;
mod registry;

#[cfg(test)]
mod api_test;

pub use builder::MapperBuilder;
pub use error::Error;
pub use mapper::Mapper;
pub use options::MapperOptions;
pub use registry::MapperRegistry;
