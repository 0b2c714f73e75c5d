//! Host scalar conversions between primitives, strings and enums.
//!
//! Numeric conversions are checked: a value outside the target range is an
//! [`ConversionError::Overflow`], never a silent wrap. Floats convert to
//! integers by rounding half to even. Strings parse with the invariant
//! format, ignoring surrounding whitespace.

use thiserror::Error;

use crate::types::{Ty, TypeKind};
use crate::values::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("value {value} is out of range for {to}")]
    Overflow { value: String, to: String },

    #[error("cannot parse {text:?} as {to}")]
    Format { text: String, to: String },

    #[error("cannot convert a value of type {from} to {to}")]
    InvalidCast { from: String, to: String },
}

/// Source value classified for conversion.
enum Scalar<'a> {
    Bool(bool),
    Char(char),
    Int(i128),
    Float(f64),
    Text(&'a str),
}

fn classify(value: &Value) -> Option<Scalar<'_>> {
    Some(match value {
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Char(c) => Scalar::Char(*c),
        Value::I8(v) => Scalar::Int(*v as i128),
        Value::I16(v) => Scalar::Int(*v as i128),
        Value::I32(v) => Scalar::Int(*v as i128),
        Value::I64(v) => Scalar::Int(*v as i128),
        Value::U8(v) => Scalar::Int(*v as i128),
        Value::U16(v) => Scalar::Int(*v as i128),
        Value::U32(v) => Scalar::Int(*v as i128),
        Value::U64(v) => Scalar::Int(*v as i128),
        Value::Enum(e) => Scalar::Int(e.bits() as i128),
        Value::F32(v) => Scalar::Float(*v as f64),
        Value::F64(v) => Scalar::Float(*v),
        Value::Str(s) => Scalar::Text(s),
        _ => return None,
    })
}

/// Integer bits of an integral or enum value, widened without loss.
pub(crate) fn integer_bits(value: &Value) -> Option<i128> {
    match classify(value)? {
        Scalar::Int(n) => Some(n),
        _ => None,
    }
}

/// Convert `value` to the primitive type `to`. Null converts to the zero
/// value of `to`.
pub fn change_type(value: &Value, to: &Ty) -> Result<Value, ConversionError> {
    if value.is_null() {
        return Ok(Value::zero(to));
    }
    let invalid = || ConversionError::InvalidCast {
        from: value.type_name(),
        to: to.to_string(),
    };
    let scalar = classify(value).ok_or_else(invalid)?;

    match to.kind() {
        TypeKind::Bool => match scalar {
            Scalar::Bool(b) => Ok(Value::Bool(b)),
            Scalar::Int(n) => Ok(Value::Bool(n != 0)),
            Scalar::Float(f) => Ok(Value::Bool(f != 0.0)),
            Scalar::Text(text) => parse_bool(text)
                .map(Value::Bool)
                .ok_or_else(|| format_error(text, to)),
            Scalar::Char(_) => Err(invalid()),
        },
        TypeKind::Char => match scalar {
            Scalar::Char(c) => Ok(Value::Char(c)),
            Scalar::Int(n) => u16::try_from(n)
                .ok()
                .and_then(|code| char::from_u32(code as u32))
                .map(Value::Char)
                .ok_or_else(|| overflow(n, to)),
            Scalar::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(format_error(text, to)),
                }
            }
            Scalar::Bool(_) | Scalar::Float(_) => Err(invalid()),
        },
        TypeKind::F32 | TypeKind::F64 => {
            let f = match scalar {
                Scalar::Bool(b) => {
                    if b {
                        1.0
                    } else {
                        0.0
                    }
                }
                Scalar::Int(n) => n as f64,
                Scalar::Float(f) => f,
                Scalar::Text(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format_error(text, to))?,
                Scalar::Char(_) => return Err(invalid()),
            };
            Ok(match to.kind() {
                TypeKind::F32 => Value::F32(f as f32),
                _ => Value::F64(f),
            })
        }
        _ if to.is_integral() => {
            let n = match scalar {
                Scalar::Bool(b) => b as i128,
                Scalar::Char(c) => c as i128,
                Scalar::Int(n) => n,
                Scalar::Float(f) => {
                    let rounded = f.round_ties_even();
                    if !rounded.is_finite() || rounded.abs() > 1e38 {
                        return Err(ConversionError::Overflow {
                            value: f.to_string(),
                            to: to.to_string(),
                        });
                    }
                    rounded as i128
                }
                Scalar::Text(text) => text
                    .trim()
                    .parse::<i128>()
                    .map_err(|_| format_error(text, to))?,
            };
            integer_value(n, to).ok_or_else(|| overflow(n, to))
        }
        _ => Err(invalid()),
    }
}

/// Checked narrowing of `n` into the integral type `to`.
fn integer_value(n: i128, to: &Ty) -> Option<Value> {
    Some(match to.kind() {
        TypeKind::I8 => Value::I8(i8::try_from(n).ok()?),
        TypeKind::I16 => Value::I16(i16::try_from(n).ok()?),
        TypeKind::I32 => Value::I32(i32::try_from(n).ok()?),
        TypeKind::I64 => Value::I64(i64::try_from(n).ok()?),
        TypeKind::U8 => Value::U8(u8::try_from(n).ok()?),
        TypeKind::U16 => Value::U16(u16::try_from(n).ok()?),
        TypeKind::U32 => Value::U32(u32::try_from(n).ok()?),
        TypeKind::U64 => Value::U64(u64::try_from(n).ok()?),
        _ => return None,
    })
}

/// Reinterpret `n` as the integral type `to`, truncating high bits.
pub(crate) fn wrapping_integer(n: i128, to: &Ty) -> Option<Value> {
    Some(match to.kind() {
        TypeKind::I8 => Value::I8(n as i8),
        TypeKind::I16 => Value::I16(n as i16),
        TypeKind::I32 => Value::I32(n as i32),
        TypeKind::I64 => Value::I64(n as i64),
        TypeKind::U8 => Value::U8(n as u8),
        TypeKind::U16 => Value::U16(n as u16),
        TypeKind::U32 => Value::U32(n as u32),
        TypeKind::U64 => Value::U64(n as u64),
        _ => return None,
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn overflow(n: i128, to: &Ty) -> ConversionError {
    ConversionError::Overflow {
        value: n.to_string(),
        to: to.to_string(),
    }
}

fn format_error(text: &str, to: &Ty) -> ConversionError {
    ConversionError::Format {
        text: text.to_string(),
        to: to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeManager;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_narrowing_is_checked() {
        let m = TypeManager::new();
        assert_eq!(change_type(&Value::I64(200), &m.u8()), Ok(Value::U8(200)));
        assert_eq!(
            change_type(&Value::I64(300), &m.u8()),
            Err(ConversionError::Overflow {
                value: "300".to_string(),
                to: "u8".to_string()
            })
        );
        assert!(change_type(&Value::I32(-1), &m.u64()).is_err());
        assert!(change_type(&Value::U64(u64::MAX), &m.i64()).is_err());
    }

    #[test]
    fn test_float_rounds_half_to_even() {
        let m = TypeManager::new();
        assert_eq!(change_type(&Value::F64(2.5), &m.i32()), Ok(Value::I32(2)));
        assert_eq!(change_type(&Value::F64(3.5), &m.i32()), Ok(Value::I32(4)));
        assert_eq!(change_type(&Value::F64(-0.5), &m.i32()), Ok(Value::I32(0)));
        assert!(change_type(&Value::F64(f64::NAN), &m.i32()).is_err());
        assert!(change_type(&Value::F64(1e300), &m.i64()).is_err());
        assert_eq!(change_type(&Value::I32(3), &m.f64()), Ok(Value::F64(3.0)));
    }

    #[test]
    fn test_strings_parse_invariant() {
        let m = TypeManager::new();
        assert_eq!(change_type(&Value::from(" 42 "), &m.i32()), Ok(Value::I32(42)));
        assert_eq!(change_type(&Value::from("-7"), &m.i16()), Ok(Value::I16(-7)));
        assert_eq!(change_type(&Value::from("1.25"), &m.f64()), Ok(Value::F64(1.25)));
        assert_eq!(change_type(&Value::from("TRUE"), &m.bool()), Ok(Value::Bool(true)));
        assert_eq!(change_type(&Value::from("x"), &m.char()), Ok(Value::Char('x')));
        assert_eq!(
            change_type(&Value::from("seven"), &m.i32()),
            Err(ConversionError::Format {
                text: "seven".to_string(),
                to: "i32".to_string()
            })
        );
        assert!(change_type(&Value::from("ab"), &m.char()).is_err());
    }

    #[test]
    fn test_bool_and_char() {
        let m = TypeManager::new();
        assert_eq!(change_type(&Value::Bool(true), &m.i32()), Ok(Value::I32(1)));
        assert_eq!(change_type(&Value::I32(0), &m.bool()), Ok(Value::Bool(false)));
        assert_eq!(change_type(&Value::I32(65), &m.char()), Ok(Value::Char('A')));
        assert_eq!(change_type(&Value::Char('A'), &m.u16()), Ok(Value::U16(65)));
        assert_eq!(
            change_type(&Value::Char('A'), &m.bool()),
            Err(ConversionError::InvalidCast {
                from: "char".to_string(),
                to: "bool".to_string()
            })
        );
        assert!(change_type(&Value::Char('A'), &m.f64()).is_err());
    }

    #[test]
    fn test_enums_convert_through_bits() {
        let m = TypeManager::new();
        let level = m
            .enumeration("Level", &m.i32())
            .variant("High", 3)
            .build()
            .unwrap();
        let high = Value::variant(&level, "High").unwrap();
        assert_eq!(change_type(&high, &m.i64()), Ok(Value::I64(3)));
        assert_eq!(change_type(&Value::Null, &m.i32()), Ok(Value::I32(0)));
    }
}
