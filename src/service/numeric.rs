use serde_json::Value;

/// Coerce a provider value into a finite float.
///
/// Accepts numbers, numeric strings and Yahoo's `{"raw": .., "fmt": ..}`
/// wrapper. Anything missing, non-finite or non-numeric becomes `None`.
pub fn to_float_or_none(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => finite(n.as_f64()),
        Value::String(s) => finite(s.trim().parse::<f64>().ok()),
        Value::Object(map) => map.get("raw").and_then(to_float_or_none),
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    }
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
