/// Tests for schema resolution
mod common;

use serde::{Deserialize, Serialize};

use avrocodec::{from_value, to_value, Schema, Value};
use common::{roundtrip_resolved, MockSchema};
use std::collections::HashMap;
use std::str::FromStr;

#[test]
fn null_fails_with_other_primitive_schema() {
    let writer_schema = MockSchema.prim("null");
    let reader_schema = MockSchema.prim("boolean");
    assert!(writer_schema.create_resolver(&reader_schema).is_err());
}

#[test]
fn writer_to_reader_promotion_primitives() {
    // int -> long, float, double
    for reader_ty in &["long", "float", "double"] {
        let writer_schema = MockSchema.prim("int");
        let reader_schema = MockSchema.prim(reader_ty);
        let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &Value::Int(1024));
        assert!(decoded.is_ok(), "int -> {} should resolve", reader_ty);
    }

    // long -> float, double
    for reader_ty in &["float", "double"] {
        let writer_schema = MockSchema.prim("long");
        let reader_schema = MockSchema.prim(reader_ty);
        let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &Value::Long(1024));
        assert!(decoded.is_ok(), "long -> {} should resolve", reader_ty);
    }

    // float -> double
    let writer_schema = MockSchema.prim("float");
    let reader_schema = MockSchema.prim("double");
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &Value::Float(1026f32));
    assert!(decoded.is_ok());

    // string -> bytes
    let writer_schema = MockSchema.prim("string");
    let reader_schema = MockSchema.prim("bytes");
    let value = Value::Str("hello".to_string());
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value).unwrap();
    assert_eq!(decoded, Value::Bytes(vec![104, 101, 108, 108, 111]));

    // bytes -> string
    let writer_schema = MockSchema.prim("bytes");
    let reader_schema = MockSchema.prim("string");
    let value = Value::Bytes(vec![104, 101, 108, 108, 111]);
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value).unwrap();
    assert_eq!(decoded, Value::Str("hello".to_string()));
}

#[derive(Serialize, Deserialize)]
enum Foo {
    A,
    B,
    C,
    E,
}

#[test]
fn enum_fails_schema_resolution() {
    let writer_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["A", "B", "C", "D"] }"##)
            .unwrap();
    let reader_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["F"] }"##).unwrap();

    let value = to_value(&Foo::B).unwrap();
    // Reading a symbol absent from the reader's symbol list fails at decode
    // time, not at resolver-compile time.
    assert!(writer_schema.create_resolver(&reader_schema).is_ok());
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value);
    assert!(decoded.is_err());
}

#[test]
fn schema_resolution_map() {
    let writer_schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();
    let reader_schema = Schema::from_str(r##"{"type": "map", "values": "int"}"##).unwrap();
    assert!(writer_schema.create_resolver(&reader_schema).is_err());
}

#[derive(Serialize, Deserialize)]
struct LongList {
    value: i64,
    next: Option<Box<LongList>>,
}

#[derive(Serialize, Deserialize, Debug)]
struct LongListDefault {
    value: i64,
    next: Option<Box<LongListDefault>>,
    other: i64,
}

#[test]
fn record_schema_resolution_with_default_value() {
    let writer_schema = MockSchema.record();
    let reader_schema = MockSchema.record_default();

    let list = LongList {
        value: 1,
        next: None,
    };
    let value = to_value(&list).unwrap();

    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value).unwrap();
    let rec: LongListDefault = from_value(&decoded).unwrap();
    assert_eq!(rec.value, 1);
    assert_eq!(rec.other, 1);
}

#[test]
fn writer_is_a_union_but_reader_is_not() {
    // Every writer branch must resolve against the reader; `null` cannot
    // resolve against a plain `int` reader, so the whole pair is rejected
    // at compile time.
    let writer_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let reader_schema = Schema::from_str(r##""int""##).unwrap();
    assert!(writer_schema.create_resolver(&reader_schema).is_err());
}

#[test]
fn reader_is_a_union_but_writer_is_not() {
    // err: neither "null" nor "string" is compatible with a plain "int" writer
    let writer_schema = Schema::from_str(r##""int""##).unwrap();
    let reader_schema = Schema::from_str(r##"["null", "string"]"##).unwrap();
    assert!(writer_schema.create_resolver(&reader_schema).is_err());

    // ok: the reader union has a compatible "int" branch
    let writer_schema = Schema::from_str(r##""int""##).unwrap();
    let reader_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &Value::Int(3)).unwrap();
    assert_eq!(decoded, Value::Union("int".to_string(), Box::new(Value::Int(3))));
}

#[test]
fn both_are_unions_but_different() {
    let writer_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let reader_schema = Schema::from_str(r##"["boolean", "string"]"##).unwrap();
    assert!(writer_schema.create_resolver(&reader_schema).is_err());
}

#[test]
fn both_are_maps() {
    let writer_schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();
    let reader_schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();

    let mut map = HashMap::new();
    map.insert("hello".to_string(), Value::Str("world".to_string()));
    let value = Value::Map(map);

    assert!(roundtrip_resolved(&writer_schema, &reader_schema, &value).is_ok());
}

#[test]
fn both_are_arrays() {
    let writer_schema = Schema::from_str(r##"{"type": "array", "items": "int"}"##).unwrap();
    let reader_schema = Schema::from_str(r##"{"type": "array", "items": "int"}"##).unwrap();
    let value = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    assert!(roundtrip_resolved(&writer_schema, &reader_schema, &value).is_ok());
}

#[test]
fn both_are_enums() {
    let writer_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS", "CLUBS"]}"##)
            .unwrap();
    let reader_schema = Schema::from_str(
        r##"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS", "CLUBS", "DIAMONDS"]}"##,
    )
    .unwrap();
    let value = Value::Enum("HEARTS".to_string());
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn enum_resolves_by_alias_with_symbols_reordered() {
    // Writer's "Foo" is known to the reader only via an alias on "Foo2", and
    // the reader's symbol list reorders "bar" to ordinal 2; the writer's
    // ordinal-0 "bar" must still decode to the reader's "bar" symbol, not to
    // whatever symbol happens to sit at ordinal 0 on the reader's side.
    let writer_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["bar", "baz"]}"##).unwrap();
    let reader_schema = Schema::from_str(
        r##"{"type": "enum", "name": "Foo2", "aliases": ["Foo"], "symbols": ["foo", "baz", "bar"]}"##,
    )
    .unwrap();

    let value = Value::Enum("bar".to_string());
    let decoded = roundtrip_resolved(&writer_schema, &reader_schema, &value).unwrap();
    assert_eq!(decoded, Value::Enum("bar".to_string()));
}

#[test]
fn null() {
    let writer_schema = Schema::from_str(r##"{"type": "null"}"##).unwrap();
    let reader_schema = Schema::from_str(r##"{"type": "null"}"##).unwrap();
    assert!(roundtrip_resolved(&writer_schema, &reader_schema, &Value::Null).is_ok());
}
