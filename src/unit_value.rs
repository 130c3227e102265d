use serde_json::Value;

/// Keys a unit/value shaped record may carry its number under
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKey {
    Value,
    Max,
    Min,
    Speed,
    Direction,
    FeelsLike,
    Gusts,
}

impl ValueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKey::Value => "value",
            ValueKey::Max => "max",
            ValueKey::Min => "min",
            ValueKey::Speed => "speed",
            ValueKey::Direction => "direction",
            ValueKey::FeelsLike => "feels_like",
            ValueKey::Gusts => "gusts",
        }
    }
}

/// Extracts a number from a field that is either a bare number or a record
/// holding the number under the given key, e.g. `{"value": 21.5, "unit": "°C"}`.
///
/// Anything else (absent field, null, strings, records without the key) gives None,
/// which is kept apart from an actual zero.
///
/// # Arguments
///
/// * 'field' - the field as found in the raw record, if any
/// * 'key' - key to look for when the field is a record
pub fn extract(field: Option<&Value>, key: ValueKey) -> Option<f64> {
    match field? {
        Value::Number(n) => finite(n.as_f64()),
        Value::Object(map) => match map.get(key.as_str()) {
            Some(Value::Number(n)) => finite(n.as_f64()),
            _ => None,
        },
        _ => None,
    }
}

/// Shorthand for extracting a bare or `{value}` shaped field from a record
///
/// # Arguments
///
/// * 'record' - the raw record
/// * 'name' - name of the field in the record
pub fn field_value(record: &Value, name: &str) -> Option<f64> {
    extract(record.get(name), ValueKey::Value)
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|f| f.is_finite())
}
