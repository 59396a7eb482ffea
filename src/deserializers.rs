//! Custom deserializers for flexible parsing of caller- and model-supplied records.
//!
//! Model output and resubmitted session state are loosely typed: a prop default
//! may arrive as `0`, `false` or `"0"`. These deserializers coerce the common
//! shapes instead of rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes an optional string, rendering scalars as text.
///
/// # Accepted Formats
///
/// * **String**: used as-is; an empty string becomes `None`
/// * **Number / bool**: rendered with `to_string`
/// * **Array / object**: rendered as compact JSON
/// * **null / missing**: `None`
pub fn de_option_string_forgiving<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(opt.and_then(|v| value_to_text(&v)))
}

/// Deserializes an optional bool from bools, `"true"/"false"/"yes"/"no"` and `0/1`.
pub fn de_option_bool_forgiving<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<Value>::deserialize(deserializer)?;
    let Some(v) = opt else { return Ok(None) };
    match v {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) => Ok(Some(n.as_f64().unwrap_or(0.0) != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" | "1" | "required" => Ok(Some(true)),
            "false" | "no" | "0" | "optional" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean '{other}'"))),
        },
        _ => Err(D::Error::custom("expected bool, number, or string")),
    }
}

/// Deserializes a string, treating null and non-text values as empty.
pub fn de_string_forgiving<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(opt.and_then(|v| value_to_text(&v)).unwrap_or_default())
}

/// Deserializes a list of strings. A bare string becomes a one-item list,
/// null becomes empty, and items with no text form are skipped.
pub fn de_string_list_forgiving<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(match opt {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Deserializes an optional non-negative integer from integers, floats
/// (rounded) and numeric strings. Anything else is `None`.
pub fn de_option_u32_forgiving<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    let number = match opt {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, f64::from(u32::MAX)) as u32))
}

/// Deserializes a float from numbers or numeric strings; anything else is `0.0`.
pub fn de_f32_forgiving<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    let number = match opt {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()).unwrap_or(0.0) as f32)
}

/// Deserializes a list, dropping items that do not fit `T` instead of
/// rejecting the whole list. Null or a non-array value becomes empty.
pub fn de_vec_skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = opt else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!("Skipping unusable list item: {}", e);
                None
            }
        })
        .collect())
}

/// Text rendering shared by the forgiving deserializers and the response extractor.
pub fn value_to_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
