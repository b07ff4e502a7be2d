mod common;

use avrocodec::{from_value, to_value, Record, Schema, Value};
use common::{roundtrip, MockSchema};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

///////////////////////////////////////////////////////////////////////////////
/// Primitive round trips
///////////////////////////////////////////////////////////////////////////////

#[test]
fn round_trip_primitives() {
    let cases: Vec<(&str, Value)> = vec![
        ("null", Value::Null),
        ("boolean", Value::Boolean(true)),
        ("int", Value::Int(i32::MAX)),
        ("long", Value::Long(i64::MAX)),
        ("float", Value::Float(f32::MAX)),
        ("double", Value::Double(f64::MAX)),
        ("bytes", Value::Bytes(b"avrocodec".to_vec())),
        ("string", Value::Str("avrocodec".to_string())),
    ];

    for (ty, value) in cases {
        let schema = MockSchema.prim(ty);
        assert_eq!(roundtrip(&schema, &value), value);
    }
}

#[test]
fn fixed_round_trip() {
    let schema = Schema::from_str(r##"{"type": "fixed", "size": 16, "name": "md5"}"##).unwrap();
    let value = Value::Fixed(b"0123456789abcdef".to_vec());
    assert_eq!(roundtrip(&schema, &value), value);
}

#[test]
fn array_round_trip() {
    let schema = Schema::from_str(r##"{"type": "array", "items": "string"}"##).unwrap();
    let value = Value::Array(
        ["a", "v", "r", "o"]
            .iter()
            .map(|s| Value::Str(s.to_string()))
            .collect(),
    );
    assert_eq!(roundtrip(&schema, &value), value);
}

#[test]
fn map_round_trip() {
    let schema = Schema::from_str(r##"{"type": "map", "values": "long"}"##).unwrap();
    let mut map = HashMap::new();
    map.insert("foo".to_string(), Value::Long(1));
    map.insert("bar".to_string(), Value::Long(2));
    let value = Value::Map(map);
    assert_eq!(roundtrip(&schema, &value), value);
}

#[test]
fn union_round_trip() {
    let schema = Schema::from_str(r##"["null", "string"]"##).unwrap();
    assert_eq!(roundtrip(&schema, &Value::Null), Value::Null);

    let value = Value::Union("string".to_string(), Box::new(Value::Str("hello".to_string())));
    assert_eq!(roundtrip(&schema, &value), value);
}

#[test]
fn enum_round_trip() {
    let schema = Schema::from_str(
        r##"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS", "DIAMONDS", "CLUBS"]}"##,
    )
    .unwrap();
    let value = Value::Enum("HEARTS".to_string());
    assert_eq!(roundtrip(&schema, &value), value);
}

#[test]
fn write_invalid_union_data_fails() {
    let schema = Schema::from_str(r##"["int", "float"]"##).unwrap();
    let value = Value::Str("string".to_string());
    assert!(schema.to_buffer(&value, false).is_err());
}

///////////////////////////////////////////////////////////////////////////////
/// Self-referential record, through the serde bridge
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct LongList {
    value: i64,
    next: Option<Box<LongList>>,
}

#[test]
fn read_write_self_referential_record() {
    let schema = MockSchema.record();

    let list = LongList {
        value: 1,
        next: Some(Box::new(LongList {
            value: 2,
            next: Some(Box::new(LongList {
                value: 3,
                next: None,
            })),
        })),
    };

    let value = wrap_next_in_union(&to_value(&list).unwrap());

    let decoded = roundtrip(&schema, &value);
    let back: LongList = from_value(&decoded).unwrap();
    assert_eq!(back, list);
}

/// `to_value` has no schema to consult, so it cannot know a record field
/// typed as a union needs `Value::Union` tagging; this walks a `LongList`
/// value tagging every `next` field the way the `["null", "LongList"]`
/// schema expects.
fn wrap_next_in_union(value: &Value) -> Value {
    match value {
        Value::Record(r) => {
            let mut rec = Record::new(r.name());
            let value_field = r.field("value").unwrap().clone();
            rec.insert("value", value_field).unwrap();
            let wrapped_next = match r.field("next").unwrap() {
                Value::Null => Value::Null,
                next @ Value::Record(_) => {
                    Value::Union("LongList".to_string(), Box::new(wrap_next_in_union(next)))
                }
                other => other.clone(),
            };
            rec.insert("next", wrapped_next).unwrap();
            Value::Record(rec)
        }
        other => other.clone(),
    }
}

#[test]
fn bytes_round_trip_via_serde() {
    let schema = Schema::from_str(r##"{"type": "bytes"}"##).unwrap();
    let data: &[u8] = &[0, 1, 2, 3, 4, 5];
    let value = to_value(&data).unwrap();
    let decoded = roundtrip(&schema, &value);
    assert_eq!(decoded, Value::Bytes(data.to_vec()));
}
