//! Host text conversions: `to_string` semantics and enum parsing.

use crate::types::EnumDef;
use crate::values::Value;

/// The host's `to_string` for a value; `None` for null.
pub fn to_display_string(value: &Value) -> Option<String> {
    Some(match value {
        Value::Null => return None,
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Char(c) => c.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => format_float(*v as f64),
        Value::F64(v) => format_float(*v),
        Value::Str(s) => s.to_string(),
        Value::Enum(e) => match e.ty().as_enum() {
            Some(def) => format_enum(def, e.bits()),
            None => e.bits().to_string(),
        },
        Value::Struct(s) => display_or_name(value, s.ty()),
        Value::Object(obj) => display_or_name(value, obj.ty()),
        Value::Seq(seq) => seq.ty().to_string(),
    })
}

fn display_or_name(value: &Value, ty: &crate::types::Ty) -> String {
    match ty.object_def().and_then(|def| def.display()) {
        Some(display) => display(value),
        None => ty.to_string(),
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        v.to_string()
    }
}

/// Variant name, `A, B` for a combination of flags, or the number.
pub fn format_enum(def: &EnumDef, bits: i64) -> String {
    if let Some(name) = def.name_of(bits) {
        return name.to_string();
    }
    if def.is_flags() && bits != 0 {
        let mut flags: Vec<&(String, i64)> =
            def.variants().iter().filter(|(_, value)| *value != 0).collect();
        flags.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining = bits;
        let mut names = Vec::new();
        for (name, value) in flags {
            if remaining & value == *value {
                remaining &= !value;
                names.push(name.as_str());
            }
        }
        if remaining == 0 {
            names.reverse();
            return names.join(", ");
        }
    }
    bits.to_string()
}

/// Case-insensitive parse of a variant name, a comma-separated list of
/// names (combined with bitwise or) or a number.
pub fn parse_enum(def: &EnumDef, text: &str) -> Option<i64> {
    let text = text.trim();
    let first = text.chars().next()?;
    if first.is_ascii_digit() || first == '-' || first == '+' {
        return text.parse::<i64>().ok();
    }
    text.split(',').try_fold(0i64, |bits, part| {
        def.value_of(part.trim()).map(|value| bits | value)
    })
}
