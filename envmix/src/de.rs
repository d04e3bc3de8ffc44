//! Shape-driven coercion of environment text into field values
//!
//! Every composite shape accepts two encodings: a JSON document, which is
//! always tried first, and a comma-separated fallback. The format is never
//! guessed from content beyond whether the JSON parse succeeds.

use crate::error::{CoerceError, NestedError};
use crate::factory;
use crate::schema::{ScalarKind, SchemaDescriptor, Shape};
use serde_json::{Map, Number, Value};

const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];
const FALSY: [&str; 4] = ["false", "0", "no", "off"];

/// Coerce raw environment text into a value of `shape`.
///
/// `path` names the value for nested error reporting; for a top-level field
/// it is the field name.
pub fn coerce(raw: &str, shape: &Shape, path: &str) -> Result<Value, CoerceError> {
    match shape {
        Shape::Scalar(kind) => coerce_scalar(raw, *kind),
        Shape::Sequence(_) | Shape::Tuple(_) | Shape::Set(_) => {
            let items = match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(items)) => items,
                _ => split_items(raw, shape)?,
            };
            coerce_array(items, shape, raw, path)
        }
        Shape::Mapping { key, value } => {
            let entries = match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(object)) => object.into_iter().collect(),
                _ => split_pairs(raw, shape, value)?,
            };
            coerce_entries(entries, key, value, path)
        }
        Shape::Tagged(allowed) => {
            if let Some(literal) = allowed.iter().find(|literal| **literal == raw) {
                return Ok(Value::String((*literal).to_string()));
            }
            match serde_json::from_str::<String>(raw) {
                Ok(text) => coerce_literal(&text, allowed),
                Err(_) => coerce_literal(raw, allowed),
            }
        }
        Shape::Nested(schema) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => factory::assemble_nested(schema, object, path),
            Ok(_) => Err(nested_error(schema, path, raw, NestedError::NotAnObject)),
            Err(e) => Err(nested_error(schema, path, raw, NestedError::Malformed(e))),
        },
        Shape::Optional(inner) => coerce(raw, inner, path),
    }
}

/// Coerce a value found inside a structured document into `shape`.
///
/// JSON strings standing in for scalars are parsed as environment text, so
/// `["1", "2"]` and `[1, 2]` are equivalent for a list of integers.
pub fn coerce_value(value: Value, shape: &Shape, path: &str) -> Result<Value, CoerceError> {
    match (shape, value) {
        (Shape::Optional(_), Value::Null) => Ok(Value::Null),
        (Shape::Optional(inner), value) => coerce_value(value, inner, path),
        (Shape::Scalar(ScalarKind::String | ScalarKind::Path), Value::String(text)) => {
            Ok(Value::String(text))
        }
        (Shape::Scalar(kind), Value::String(text)) => coerce_scalar(&text, *kind),
        (Shape::Scalar(ScalarKind::Bool), Value::Bool(flag)) => Ok(Value::Bool(flag)),
        (Shape::Scalar(kind @ ScalarKind::Int { .. }), Value::Number(number)) => {
            check_integer(&number, *kind)
        }
        (Shape::Scalar(ScalarKind::Float { .. }), Value::Number(number)) => {
            Ok(Value::Number(number))
        }
        (Shape::Scalar(ScalarKind::Bool), other) => Err(CoerceError::InvalidBoolean {
            value: display(&other),
        }),
        (Shape::Scalar(kind @ (ScalarKind::Int { .. } | ScalarKind::Float { .. })), other) => {
            Err(CoerceError::invalid_number(kind, display(&other), "expected a number"))
        }
        (Shape::Scalar(kind), other) => Err(CoerceError::structured(
            kind,
            display(&other),
            "expected a string",
        )),
        (Shape::Sequence(_) | Shape::Tuple(_) | Shape::Set(_), Value::Array(items)) => {
            let text = display(&Value::Array(items.clone()));
            coerce_array(items, shape, &text, path)
        }
        (Shape::Mapping { key, value }, Value::Object(object)) => {
            coerce_entries(object.into_iter().collect(), key, value, path)
        }
        (Shape::Tagged(allowed), Value::String(text)) => coerce_literal(&text, allowed),
        (Shape::Tagged(allowed), other) => Err(CoerceError::UnknownLiteral {
            value: display(&other),
            allowed: allowed.to_vec(),
        }),
        (Shape::Nested(schema), Value::Object(object)) => {
            factory::assemble_nested(schema, object, path)
        }
        (Shape::Nested(schema), other) => Err(nested_error(
            schema,
            path,
            &display(&other),
            NestedError::NotAnObject,
        )),
        (Shape::Sequence(_) | Shape::Tuple(_) | Shape::Set(_), other) => Err(
            CoerceError::structured(shape, display(&other), "expected a JSON array"),
        ),
        (Shape::Mapping { .. }, other) => Err(CoerceError::structured(
            shape,
            display(&other),
            "expected a JSON object",
        )),
    }
}

fn coerce_scalar(raw: &str, kind: ScalarKind) -> Result<Value, CoerceError> {
    match kind {
        ScalarKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| CoerceError::InvalidBoolean {
                value: raw.to_string(),
            }),
        ScalarKind::Int { signed, bits } => {
            let parsed = raw
                .parse::<i128>()
                .map_err(|e| CoerceError::invalid_number(kind, raw, e))?;
            integer_value(parsed, signed, bits)
                .ok_or_else(|| CoerceError::invalid_number(kind, raw, "out of range"))
        }
        ScalarKind::Float { .. } => {
            let parsed = raw
                .parse::<f64>()
                .map_err(|e| CoerceError::invalid_number(kind, raw, e))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| CoerceError::invalid_number(kind, raw, "not a finite number"))
        }
        // A JSON string literal is unwrapped so quoted and bare text agree.
        ScalarKind::String | ScalarKind::Path => Ok(Value::String(
            serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.to_string()),
        )),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.to_ascii_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn integer_value(n: i128, signed: bool, bits: u32) -> Option<Value> {
    if bits == 0 || bits > 64 {
        return None;
    }
    let (min, max) = if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        (0, (1i128 << bits) - 1)
    };
    if n < min || n > max {
        return None;
    }
    if n < 0 {
        i64::try_from(n).ok().map(Value::from)
    } else {
        u64::try_from(n).ok().map(Value::from)
    }
}

fn check_integer(number: &Number, kind: ScalarKind) -> Result<Value, CoerceError> {
    let ScalarKind::Int { signed, bits } = kind else {
        return Ok(Value::Number(number.clone()));
    };
    let parsed = match (number.as_i64(), number.as_u64()) {
        (Some(n), _) => i128::from(n),
        (None, Some(n)) => i128::from(n),
        (None, None) => match number.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() < 2f64.powi(64) => n as i128,
            _ => {
                return Err(CoerceError::invalid_number(
                    kind,
                    number.to_string(),
                    "expected an integer",
                ))
            }
        },
    };
    integer_value(parsed, signed, bits)
        .ok_or_else(|| CoerceError::invalid_number(kind, number.to_string(), "out of range"))
}

fn coerce_literal(text: &str, allowed: &[&'static str]) -> Result<Value, CoerceError> {
    if allowed.contains(&text) {
        Ok(Value::String(text.to_string()))
    } else {
        Err(CoerceError::UnknownLiteral {
            value: text.to_string(),
            allowed: allowed.to_vec(),
        })
    }
}

fn element_shapes(shape: &Shape) -> &[Shape] {
    match shape {
        Shape::Sequence(elem) | Shape::Set(elem) => std::slice::from_ref(elem.as_ref()),
        Shape::Tuple(elems) => elems.as_slice(),
        _ => &[],
    }
}

/// Comma-separated fallback for sequence, tuple and set shapes.
fn split_items(raw: &str, shape: &Shape) -> Result<Vec<Value>, CoerceError> {
    if element_shapes(shape).iter().any(Shape::requires_structure) {
        return Err(CoerceError::structured(
            shape,
            raw,
            "nested collections cannot be comma-separated; provide a JSON array",
        ));
    }
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(raw
        .split(',')
        .map(|item| Value::String(item.trim().to_string()))
        .collect())
}

/// Comma-separated `key=value` fallback for mapping shapes.
fn split_pairs(
    raw: &str,
    shape: &Shape,
    value_shape: &Shape,
) -> Result<Vec<(String, Value)>, CoerceError> {
    if value_shape.requires_structure() {
        return Err(CoerceError::structured(
            shape,
            raw,
            "nested values cannot be given as key=value pairs; provide a JSON object",
        ));
    }
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => Ok((
                key.trim().to_string(),
                Value::String(value.trim().to_string()),
            )),
            None => Err(CoerceError::structured(
                shape,
                pair,
                "expected key=value pairs or a JSON object",
            )),
        })
        .collect()
}

fn coerce_array(
    items: Vec<Value>,
    shape: &Shape,
    text: &str,
    path: &str,
) -> Result<Value, CoerceError> {
    match shape {
        Shape::Tuple(elems) => {
            if items.len() != elems.len() {
                return Err(CoerceError::LengthMismatch {
                    shape: shape.to_string(),
                    value: text.to_string(),
                    expected: elems.len(),
                    found: items.len(),
                });
            }
            items
                .into_iter()
                .zip(elems)
                .enumerate()
                .map(|(i, (item, elem))| coerce_value(item, elem, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Shape::Sequence(elem) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| coerce_value(item, elem, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Shape::Set(elem) => {
            let mut unique: Vec<Value> = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let coerced = coerce_value(item, elem, &format!("{path}[{i}]"))?;
                if !unique.contains(&coerced) {
                    unique.push(coerced);
                }
            }
            Ok(Value::Array(unique))
        }
        _ => Err(CoerceError::structured(shape, text, "expected a collection shape")),
    }
}

fn coerce_entries(
    entries: Vec<(String, Value)>,
    key_shape: &Shape,
    value_shape: &Shape,
    path: &str,
) -> Result<Value, CoerceError> {
    let mut object = Map::new();
    for (key, value) in entries {
        // String keys are kept verbatim; other key shapes are only checked.
        let key = match key_shape {
            Shape::Scalar(ScalarKind::String | ScalarKind::Path) => key,
            _ => match coerce(&key, key_shape, path)? {
                Value::String(text) => text,
                other => other.to_string(),
            },
        };
        let value = coerce_value(value, value_shape, &format!("{path}.{key}"))?;
        object.insert(key, value);
    }
    Ok(Value::Object(object))
}

pub(crate) fn nested_error(
    schema: &SchemaDescriptor,
    path: &str,
    value: &str,
    source: NestedError,
) -> CoerceError {
    CoerceError::NestedValidation {
        schema: schema.name(),
        path: path.to_string(),
        value: value.to_string(),
        source,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
