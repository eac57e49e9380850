use super::models::{Value, ValueType};
use super::FirestoreError;
use serde_json::{json, Map, Value as SerdeValue};
use std::collections::HashMap;

pub fn convert_fields_to_serde_value(
    fields: &HashMap<String, Value>,
) -> Result<SerdeValue, FirestoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.clone(), convert_value_to_serde_value(value)?);
    }
    Ok(SerdeValue::Object(map))
}

pub fn convert_value_to_serde_value(value: &Value) -> Result<SerdeValue, FirestoreError> {
    Ok(match &value.value_type {
        ValueType::StringValue(s) => SerdeValue::String(s.clone()),
        ValueType::IntegerValue(s) => {
            let i: i64 = s
                .parse()
                .map_err(|_| FirestoreError::InvalidInteger(s.clone()))?;
            SerdeValue::Number(i.into())
        }
        // Non-finite doubles have no JSON number form and become null.
        ValueType::DoubleValue(d) => serde_json::Number::from_f64(*d)
            .map(SerdeValue::Number)
            .unwrap_or(SerdeValue::Null),
        ValueType::BooleanValue(b) => SerdeValue::Bool(*b),
        ValueType::MapValue(map_value) => convert_fields_to_serde_value(&map_value.fields)?,
        ValueType::ArrayValue(array_value) => {
            let values = array_value
                .values
                .iter()
                .map(convert_value_to_serde_value)
                .collect::<Result<Vec<_>, _>>()?;
            SerdeValue::Array(values)
        }
        ValueType::NullValue(_) => SerdeValue::Null,
        ValueType::TimestampValue(s) => SerdeValue::String(s.clone()),
        ValueType::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        ValueType::BytesValue(s) => SerdeValue::String(s.clone()),
        ValueType::ReferenceValue(s) => SerdeValue::String(s.clone()),
    })
}

/// Largest magnitude below which every integral `f64` is exactly an integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rebuilds `value` with every object's keys in sorted order and integral
/// doubles written as integers, so `1`, `1.0` and `-0.0` compare equal to
/// their integer form.
///
/// Holds regardless of whether `serde_json` is built with `preserve_order`.
pub fn canonicalize(value: &SerdeValue) -> SerdeValue {
    match value {
        SerdeValue::Object(map) => {
            let mut entries: Vec<(&String, &SerdeValue)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            SerdeValue::Object(sorted)
        }
        SerdeValue::Array(values) => SerdeValue::Array(values.iter().map(canonicalize).collect()),
        SerdeValue::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
                SerdeValue::Number((f as i64).into())
            }
            _ => SerdeValue::Number(n.clone()),
        },
        other => other.clone(),
    }
}

/// Canonical JSON text of `value`: object keys sorted, no insignificant whitespace.
pub fn canonical_json(value: &SerdeValue) -> String {
    canonicalize(value).to_string()
}
