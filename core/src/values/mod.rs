//! Runtime values the compiled mappers read and produce.

mod convert;
mod format;
mod value;


pub use convert::{ConversionError, change_type};
pub(crate) use convert::{integer_bits, wrapping_integer};
pub use format::{format_enum, parse_enum, to_display_string};
pub use value::{EnumValue, ObjRef, SeqRef, StructValue, Value};
