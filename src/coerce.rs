//! Coercion of raw flag input, driven by the shape of the default value.
//!
//! The default is the only signal of a setting's intended type, so each leaf
//! gets a [`Shape`] once, when the documentation tree is built, and binding
//! dispatches on that tag. Selection order:
//!
//! | Default | Shape | Input handling |
//! |---------|-------|----------------|
//! | boolean | `Boolean` | `"true"`/`"false"`, anything else keeps the default |
//! | array | `Sequence` | JSON array, else comma split |
//! | integer (or whole float) | `Integer` | leading base-10 integer, else NaN |
//! | empty table | `Structured` | JSON, malformed input is an error |
//! | anything else | `Opaque` | unchanged |

use toml::{Table, Value};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::PlugfigError;
use crate::meta::display_scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Boolean,
    Sequence,
    Integer,
    Structured,
    Opaque,
}

impl Shape {
    /// Classify a default value.
    pub fn of(default: &Value) -> Shape {
        match default {
            Value::Boolean(_) => Shape::Boolean,
            Value::Array(_) => Shape::Sequence,
            Value::Integer(_) => Shape::Integer,
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Shape::Integer,
            Value::Table(t) if t.is_empty() => Shape::Structured,
            _ => Shape::Opaque,
        }
    }
}

/// Coerce `raw` for the flag `flag` according to `shape`.
///
/// Only [`Shape::Structured`] can fail; the other shapes degrade to a
/// fallback and record a diagnostic where the input was unusable.
pub fn coerce(
    shape: Shape,
    flag: &str,
    raw: &Value,
    default: &Value,
    diagnostics: &mut Diagnostics,
) -> Result<Value, PlugfigError> {
    match shape {
        Shape::Boolean => Ok(coerce_bool(flag, raw, default, diagnostics)),
        Shape::Sequence => Ok(coerce_sequence(raw)),
        Shape::Integer => Ok(coerce_integer(raw)),
        Shape::Structured => coerce_structured(flag, raw),
        Shape::Opaque => Ok(raw.clone()),
    }
}

fn coerce_bool(flag: &str, raw: &Value, default: &Value, diagnostics: &mut Diagnostics) -> Value {
    match raw {
        Value::Boolean(_) => raw.clone(),
        Value::String(s) if s == "true" => Value::Boolean(true),
        Value::String(s) if s == "false" => Value::Boolean(false),
        other => {
            diagnostics.push(Diagnostic::CoercionFallback {
                flag: flag.to_string(),
                input: display_scalar(other),
                fallback: display_scalar(default),
            });
            default.clone()
        }
    }
}

fn coerce_sequence(raw: &Value) -> Value {
    let Value::String(s) = raw else {
        return match raw {
            Value::Array(_) => raw.clone(),
            other => Value::Array(vec![other.clone()]),
        };
    };
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(s)
        && let Some(items) = items.into_iter().map(json_to_toml).collect::<Option<Vec<_>>>()
    {
        return Value::Array(items);
    }
    Value::Array(
        s.split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
    )
}

fn coerce_integer(raw: &Value) -> Value {
    match raw {
        Value::Integer(_) => raw.clone(),
        Value::Float(f) if f.is_finite() => Value::Integer(f.trunc() as i64),
        Value::String(s) => parse_leading_int(s)
            .map(Value::Integer)
            .unwrap_or(Value::Float(f64::NAN)),
        _ => Value::Float(f64::NAN),
    }
}

/// Parse the leading base-10 integer of `s`: `"42"`, `" -7px"`, `"3.9"` → 3.
fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn coerce_structured(flag: &str, raw: &Value) -> Result<Value, PlugfigError> {
    let Value::String(s) = raw else {
        return Ok(raw.clone());
    };
    let parsed: serde_json::Value =
        serde_json::from_str(s).map_err(|e| PlugfigError::StructuredInput {
            flag: flag.to_string(),
            reason: e.to_string(),
        })?;
    json_to_toml(parsed).ok_or_else(|| PlugfigError::StructuredInput {
        flag: flag.to_string(),
        reason: "null is not a valid setting value".into(),
    })
}

/// Convert JSON into a TOML value. `null` anywhere has no TOML form.
fn json_to_toml(value: serde_json::Value) -> Option<Value> {
    Some(match value {
        serde_json::Value::Null => return None,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64()?),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_toml).collect::<Option<_>>()?)
        }
        serde_json::Value::Object(map) => {
            let mut table = Table::new();
            for (k, v) in map {
                table.insert(k, json_to_toml(v)?);
            }
            Value::Table(table)
        }
    })
}
