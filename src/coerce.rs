//! Coercion of raw runtime values into the platform's primitive and
//! collection data types.
//!
//! Independent of the dependency analysis: the two share no data structures
//! and are composed by callers only (typically: render a template, then
//! coerce the resolved field values for storage or comparison).
//!
//! Basic data types are `boolean | long | double | string | slug | list |
//! map | <type>List | <type>Map`.

use serde_json::Value;
use thiserror::Error;

/// Value coercion failures.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("cannot convert to Affinity types")]
    AffinityType,

    #[error("cannot convert value '{0}' to an integer number")]
    NotAnInteger(Value),

    #[error("cannot convert value '{0}' to a floating point number")]
    NotAFloat(Value),

    #[error("value '{0}' has no text form")]
    NotText(Value),

    #[error("value '{0}' is not an object")]
    NotAnObject(Value),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reduces a platform data-type name to its basic storable type.
///
/// `int`, `long` and the time-like types collapse to `long`; `double`,
/// `percent` and `currency` to `double`; `slug` and `string` to `string`.
/// `…List`/`…list` and `…Map`/`…map` suffixes recurse on the item type and
/// re-append `List`/`Map`, so `intList` becomes `longList`. Affinity types
/// cannot be stored as basic values. Every other name is an object ID and
/// collapses to `string`.
pub fn basic_data_type(data_type: &str) -> Result<String, CoerceError> {
    let basic = match data_type {
        "boolean" => "boolean".to_string(),
        "int" | "long" | "time" | "timestamp" | "duration" => "long".to_string(),
        "double" | "percent" | "currency" => "double".to_string(),
        "slug" | "string" => "string".to_string(),
        "list" | "map" => data_type.to_string(),
        other => {
            if other.contains("Affinity") {
                return Err(CoerceError::AffinityType);
            } else if let Some(item) = strip_collection_suffix(other, "List", "list") {
                format!("{}List", basic_data_type(item)?)
            } else if let Some(item) = strip_collection_suffix(other, "Map", "map") {
                format!("{}Map", basic_data_type(item)?)
            } else {
                "string".to_string()
            }
        }
    };
    Ok(basic)
}

fn strip_collection_suffix<'a>(
    data_type: &'a str,
    upper: &str,
    lower: &str,
) -> Option<&'a str> {
    data_type
        .strip_suffix(upper)
        .or_else(|| data_type.strip_suffix(lower))
}

/// Converts `value` to an already-basic data type.
///
/// The coercions are loose on purpose, matching what template authors
/// expect: truthiness for booleans, leading-prefix number parsing for
/// strings, single values wrapped into one-element lists. Maps require an
/// object; numbers require at least a parseable prefix.
pub fn convert_to_basic_data_type(value: &Value, basic_type: &str) -> Result<Value, CoerceError> {
    match basic_type {
        "boolean" => Ok(Value::Bool(is_truthy(value))),
        "int" | "long" => to_long(value),
        "float" | "double" => to_double(value),
        "string" | "slug" => {
            // TODO slug: strip diacritics and replace non-letter characters.
            Ok(Value::String(to_text(value)?))
        }
        other => {
            if let Some(item_type) = strip_collection_suffix(other, "List", "list") {
                convert_list(value, item_type)
            } else if let Some(item_type) = strip_collection_suffix(other, "Map", "map") {
                convert_map(value, item_type)
            } else {
                Ok(value.clone())
            }
        }
    }
}

/// Converts `value` to `data_type`, reducing the type to its basic form
/// first.
pub fn convert_to_data_type(value: &Value, data_type: &str) -> Result<Value, CoerceError> {
    let basic_type = basic_data_type(data_type)?;
    convert_to_basic_data_type(value, &basic_type)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_long(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::Number(n) => n
            .as_f64()
            .map(|f| Value::from(f.trunc() as i64))
            .ok_or_else(|| CoerceError::NotAnInteger(value.clone())),
        Value::String(s) => leading_f64(s)
            .map(|f| Value::from(f.trunc() as i64))
            .ok_or_else(|| CoerceError::NotAnInteger(value.clone())),
        _ => Err(CoerceError::NotAnInteger(value.clone())),
    }
}

fn to_double(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(b) => Ok(Value::from(f64::from(u8::from(*b)))),
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => leading_f64(s)
            .map(Value::from)
            .ok_or_else(|| CoerceError::NotAFloat(value.clone())),
        _ => Err(CoerceError::NotAFloat(value.clone())),
    }
}

fn to_text(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::Null => Err(CoerceError::NotText(value.clone())),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => {
            let parts: Result<Vec<_>, _> = items.iter().map(to_text).collect();
            Ok(parts?.join(","))
        }
        // No meaningful text form; serialize rather than fail.
        Value::Object(_) => Ok(value.to_string()),
    }
}

fn convert_list(value: &Value, item_type: &str) -> Result<Value, CoerceError> {
    let items = match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    if item_type.is_empty() {
        // Plain `list`: item types are left alone.
        return Ok(Value::Array(items));
    }
    let converted: Result<Vec<_>, _> = items
        .iter()
        .map(|item| convert_to_basic_data_type(item, item_type))
        .collect();
    Ok(Value::Array(converted?))
}

fn convert_map(value: &Value, item_type: &str) -> Result<Value, CoerceError> {
    let Value::Object(entries) = value else {
        return Err(CoerceError::NotAnObject(value.clone()));
    };
    if item_type.is_empty() {
        // Plain `map`: item types are left alone.
        return Ok(value.clone());
    }
    let mut converted = serde_json::Map::with_capacity(entries.len());
    for (key, item) in entries {
        converted.insert(key.clone(), convert_to_basic_data_type(item, item_type)?);
    }
    Ok(Value::Object(converted))
}

/// Parses the longest numeric prefix of `text`, after leading whitespace.
/// Mirrors how template scripts parse user-entered numbers: `"123.45px"`
/// yields `123.45`, a fully non-numeric string yields nothing.
fn leading_f64(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            '0'..='9' => seen_digit = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].parse().ok()
}
