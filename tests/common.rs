#![allow(dead_code)]

use avrocodec::{Schema, Value};
use std::str::FromStr;

pub(crate) struct MockSchema;

impl MockSchema {
    /// Creates a primitive schema, e.g. `MockSchema.prim("long")`.
    pub fn prim(self, ty: &str) -> Schema {
        let schema_str = format!("{{\"type\": \"{}\"}}", ty);
        Schema::from_str(&schema_str).unwrap()
    }

    pub fn record(self) -> Schema {
        Schema::from_str(
            r#"
        {
            "type": "record",
            "name": "LongList",
            "aliases": ["LinkedLongs"],
            "fields" : [
              {"name": "value", "type": "long"},
              {"name": "next", "type": ["null", "LongList"]}
            ]
        }
        "#,
        )
        .unwrap()
    }

    pub fn record_default(self) -> Schema {
        Schema::from_str(
            r#"
        {
            "type": "record",
            "name": "LongList",
            "aliases": ["LinkedLongs"],
            "fields" : [
              {"name": "value", "type": "long"},
              {"name": "next", "type": ["null", "LongList"]},
              {"name": "other", "type":"long", "default": 1}
            ]
        }
        "#,
        )
        .unwrap()
    }
}

/// Encodes `value` against `schema` and decodes it back with the same schema.
pub(crate) fn roundtrip(schema: &Schema, value: &Value) -> Value {
    let buf = schema.to_buffer(value, false).unwrap();
    schema.from_buffer(&buf, false).unwrap()
}

/// Encodes `value` against `writer`, then decodes the bytes using a resolver
/// compiled for `writer` read by `reader`.
pub(crate) fn roundtrip_resolved(
    writer: &Schema,
    reader: &Schema,
    value: &Value,
) -> avrocodec::AvroResult<Value> {
    let buf = writer.to_buffer(value, false)?;
    let resolver = writer.create_resolver(reader)?;
    resolver.decode(&buf, false)
}
