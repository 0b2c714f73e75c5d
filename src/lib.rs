//! Remap - compiled object-to-object mapping
//!
//! # Overview
//!
//! Remap builds mapping functions between host types described at runtime.
//! Target members are bound to source expressions, missing bindings are
//! filled in by name and every binding is converted with an ordered chain of
//! conversion rules. The result is compiled once and can then map any number
//! of values, from any number of threads.
//!
//! # Quick Start
//!
//! ```
//! use remap::{MapperBuilder, TypeManager, Value};
//!
//! let types = TypeManager::new();
//! let order = types.class("Order").unwrap()
//!     .property("Id", &types.i32())
//!     .property("City", &types.string())
//!     .build().unwrap();
//! let address = types.class("Address").unwrap()
//!     .property("City", &types.string())
//!     .build().unwrap();
//! let invoice = types.class("Invoice").unwrap()
//!     .property("Id", &types.string())
//!     .property("Shipping", &address)
//!     .build().unwrap();
//!
//! let mut builder = MapperBuilder::new(&types, &order, &invoice);
//! builder.auto_bind();
//! builder.bind_path("Shipping.City", "City").unwrap();
//! let mapper = builder.build().unwrap();
//!
//! let input = Value::construct(&order);
//! let fields = input.as_object().unwrap();
//! fields.set("Id", Value::from(42));
//! fields.set("City", Value::from("Lyon"));
//!
//! let output = mapper.map(&input).unwrap();
//! assert_eq!(output.get("Id"), Some(Value::from("42")));
//! let shipping = output.get("Shipping").unwrap();
//! assert_eq!(shipping.get("City"), Some(Value::from("Lyon")));
//! ```
//!
//! # Caching
//!
//! [`MapperRegistry`] keeps one auto-bound mapper per (source, target) pair
//! and builds it at most once, even under concurrent first use.
//!
//! # Errors
//!
//! Configuration errors are reported by the builder or by `build()`, never
//! while mapping. [`render_error`] formats them with the offending member
//! path highlighted.

pub use remap_core::api::{Error, Mapper, MapperBuilder, MapperOptions, MapperRegistry};
pub use remap_core::compiler::{CompileError, RuntimeError};
pub use remap_core::converters::{self, ConversionRule, ConverterChain};
pub use remap_core::expr::{self, Expr};
pub use remap_core::mapping::{ConfigError, OutputLocation};
pub use remap_core::types::{self, MemberSpec, Ty, TypeError, TypeManager};
pub use remap_core::values::{self, ConversionError, Value};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
