use super::convert::{canonical_json, convert_fields_to_serde_value, convert_value_to_serde_value};
use super::models::{DocumentEventData, Value, ValueType};
use super::{relative_document_path, DocumentPattern, FirestoreError};
use serde_json::json;

fn value(raw: serde_json::Value) -> Value {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn test_convert_nested_values() {
    let v = value(json!({
        "mapValue": {
            "fields": {
                "count": { "integerValue": "30" },
                "ratio": { "doubleValue": 0.5 },
                "open": { "booleanValue": true },
                "tags": { "arrayValue": { "values": [ { "stringValue": "a" }, { "nullValue": null } ] } },
                "where": { "geoPointValue": { "latitude": 40.4, "longitude": -3.7 } }
            }
        }
    }));

    let converted = convert_value_to_serde_value(&v).unwrap();
    assert_eq!(
        converted,
        json!({
            "count": 30,
            "ratio": 0.5,
            "open": true,
            "tags": ["a", null],
            "where": { "latitude": 40.4, "longitude": -3.7 }
        })
    );
}

#[test]
fn test_empty_map_and_array_values() {
    let map = value(json!({ "mapValue": {} }));
    let array = value(json!({ "arrayValue": {} }));

    assert_eq!(convert_value_to_serde_value(&map).unwrap(), json!({}));
    assert_eq!(convert_value_to_serde_value(&array).unwrap(), json!([]));
}

#[test]
fn test_invalid_integer_is_rejected() {
    let v = value(json!({ "integerValue": "not-a-number" }));
    let err = convert_value_to_serde_value(&v).unwrap_err();
    assert!(matches!(err, FirestoreError::InvalidInteger(s) if s == "not-a-number"));
}

#[test]
fn test_canonical_json_ignores_key_order() {
    let a = json!({ "b": 1, "a": { "y": [ { "k2": 2, "k1": 1 } ], "x": null } });
    let b = json!({ "a": { "x": null, "y": [ { "k1": 1, "k2": 2 } ] }, "b": 1 });

    assert_eq!(canonical_json(&a), canonical_json(&b));
    assert_eq!(canonical_json(&a), r#"{"a":{"x":null,"y":[{"k1":1,"k2":2}]},"b":1}"#);
}

#[test]
fn test_canonical_json_writes_integral_doubles_as_integers() {
    assert_eq!(canonical_json(&json!({ "n": 1.0 })), canonical_json(&json!({ "n": 1 })));
    assert_eq!(canonical_json(&json!([-0.0, 2.5, 3.0])), "[0,2.5,3]");
    assert_ne!(canonical_json(&json!(1.5)), canonical_json(&json!(1)));
}

#[test]
fn test_non_finite_doubles_convert_to_null() {
    for raw in ["NaN", "Infinity", "-Infinity"] {
        let v = value(json!({ "doubleValue": raw }));
        assert!(matches!(v.value_type, ValueType::DoubleValue(d) if !d.is_finite()));
        assert_eq!(convert_value_to_serde_value(&v).unwrap(), json!(null));
    }

    let v = value(json!({ "doubleValue": "2.5" }));
    assert_eq!(convert_value_to_serde_value(&v).unwrap(), json!(2.5));
    assert!(serde_json::from_value::<Value>(json!({ "doubleValue": "lots" })).is_err());
}

#[test]
fn test_canonical_json_keeps_array_order() {
    assert_ne!(canonical_json(&json!([1, 2])), canonical_json(&json!([2, 1])));
}

#[test]
fn test_fields_from_differently_ordered_documents_match() {
    let first: DocumentEventData = serde_json::from_value(json!({
        "value": {
            "name": "projects/p/databases/(default)/documents/markers/m1",
            "fields": {
                "metadata": { "mapValue": { "fields": {
                    "floor": { "integerValue": "2" },
                    "color": { "stringValue": "red" }
                } } }
            }
        }
    }))
    .unwrap();
    let second: DocumentEventData = serde_json::from_value(json!({
        "value": {
            "name": "projects/p/databases/(default)/documents/markers/m1",
            "fields": {
                "metadata": { "mapValue": { "fields": {
                    "color": { "stringValue": "red" },
                    "floor": { "integerValue": "2" }
                } } }
            }
        }
    }))
    .unwrap();

    let a = convert_fields_to_serde_value(&first.value.unwrap().fields).unwrap();
    let b = convert_fields_to_serde_value(&second.value.unwrap().fields).unwrap();
    assert_eq!(canonical_json(&a), canonical_json(&b));
}

#[test]
fn test_parse_update_event() {
    let body = json!({
        "oldValue": {
            "name": "projects/p/databases/(default)/documents/markers/m1",
            "fields": { "title": { "stringValue": "Old" } },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        },
        "value": {
            "name": "projects/p/databases/(default)/documents/markers/m1",
            "fields": { "title": { "stringValue": "New" } },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        },
        "updateMask": { "fieldPaths": ["title"] }
    });

    let event = DocumentEventData::from_json(body.to_string().as_bytes()).unwrap();
    let after = event.value.unwrap();
    assert_eq!(after.fields["title"].as_str(), Some("New"));
    assert_eq!(after.update_time.as_deref(), Some("2024-01-02T00:00:00Z"));
    assert_eq!(event.old_value.unwrap().fields["title"].value_type, ValueType::StringValue("Old".to_string()));
    assert_eq!(event.update_mask.unwrap().field_paths, vec!["title".to_string()]);
}

#[test]
fn test_parse_event_rejects_garbage() {
    let err = DocumentEventData::from_json(b"not json").unwrap_err();
    assert!(matches!(err, FirestoreError::SerializationError(_)));
}

#[test]
fn test_document_pattern_capture() {
    let pattern = DocumentPattern::parse("markers/{markerId}").unwrap();

    assert_eq!(
        pattern.capture("markers/abc"),
        Some(vec![("markerId".to_string(), "abc".to_string())])
    );
    assert_eq!(pattern.document_id("/markers/abc/"), Some("abc".to_string()));
    assert_eq!(pattern.capture("users/abc"), None);
    assert_eq!(pattern.capture("markers/abc/comments/c1"), None);
    assert_eq!(pattern.capture("markers"), None);
}

#[test]
fn test_nested_document_pattern() {
    let pattern = DocumentPattern::parse("maps/{mapId}/markers/{markerId}").unwrap();
    assert_eq!(pattern.document_id("maps/m/markers/k"), Some("k".to_string()));
    assert_eq!(pattern.as_str(), "maps/{mapId}/markers/{markerId}");
}

#[test]
fn test_invalid_document_patterns() {
    for raw in ["", "markers", "markers/{}", "markers/{id", "markers//x/{id}", "a/b{c}"] {
        assert!(
            matches!(DocumentPattern::parse(raw), Err(FirestoreError::InvalidPattern(_))),
            "pattern {:?} should be rejected",
            raw
        );
    }
}

#[test]
fn test_relative_document_path() {
    assert_eq!(
        relative_document_path("projects/p/databases/(default)/documents/markers/m1"),
        "markers/m1"
    );
    assert_eq!(relative_document_path("documents/markers/m1"), "markers/m1");
    assert_eq!(relative_document_path("markers/m1"), "markers/m1");
}
