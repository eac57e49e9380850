use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Firestore document in its REST (JSON) representation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(flatten)]
    pub value_type: ValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    StringValue(String),
    IntegerValue(String), // Firestore sends integers as strings
    #[serde(with = "proto_double")]
    DoubleValue(f64),
    BooleanValue(bool),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
    NullValue(()),
    TimestampValue(String),
    GeoPointValue(GeoPoint),
    BytesValue(String), // base64 encoded
    ReferenceValue(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The set of field paths touched by a write.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    #[serde(default)]
    pub field_paths: Vec<String>,
}

/// Payload of a `google.cloud.firestore.document.v1.*` event in JSON encoding.
///
/// `value` is the document after the write and `old_value` the document before it;
/// an update event carries both.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventData {
    #[serde(default)]
    pub value: Option<Document>,
    #[serde(default)]
    pub old_value: Option<Document>,
    #[serde(default)]
    pub update_mask: Option<DocumentMask>,
}

impl DocumentEventData {
    pub fn from_json(body: &[u8]) -> Result<Self, super::FirestoreError> {
        Ok(serde_json::from_slice(body)?)
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::StringValue(s.into()),
        }
    }

    /// Returns the string payload when this is a `stringValue`.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value_type {
            ValueType::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

/// proto3 JSON writes non-finite doubles as the strings `"NaN"`, `"Infinity"`
/// and `"-Infinity"`; finite ones may arrive as numbers or numeric strings.
mod proto_double {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other
                    .parse()
                    .map_err(|_| de::Error::custom(format!("invalid doubleValue '{}'", other))),
            },
        }
    }
}
