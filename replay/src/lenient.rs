//! Field deserializers that don't fail on odd values. Replays come from
//! several client versions; a field with the wrong type is treated as
//! absent rather than as a broken replay.

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Whole numbers, floats (truncated) and numeric strings.
pub(crate) fn integer_from(value: &Value) -> Option<i64> {
    let float = |f: f64| f.is_finite().then(|| f.trunc() as i64);

    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(float))
        },
        _ => None,
    }
}

/// Strings as-is; numbers and booleans in their JSON spelling.
pub(crate) fn text_from(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(integer_from(&Value::deserialize(deserializer)?))
}

/// Like [`integer`], but the field has to be there and has to be usable.
pub(crate) fn required_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    integer_from(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, found {value}")))
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from(Value::deserialize(deserializer)?))
}

/// Falls back to `T::default()` when the value doesn't fit.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Entries of an array (or a lone object), each decoded on its own. Entries
/// that don't fit are dropped without affecting their neighbours.
pub(crate) fn entries_of<T>(value: &Value) -> Vec<T>
where
    T: DeserializeOwned,
{
    match value {
        Value::Array(items) => items.iter().filter_map(|item| T::deserialize(item).ok()).collect(),
        Value::Object(_) => T::deserialize(value).ok().into_iter().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(entries_of(&Value::deserialize(deserializer)?))
}
