use anyhow::Error;
use avrocodec::{from_value, to_value, Record, Schema, Value};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
struct LongList {
    value: i64,
    next: Option<Box<LongList>>,
}

// `to_value` has no schema to consult, so a `next: Option<Box<LongList>>`
// field serializes its `Some` branch as a bare `Value::Record` rather than
// the `Value::Union("LongList", ...)` the `["null", "LongList"]` schema
// expects. Walk the value once to tag it before encoding.
fn wrap_next_in_union(value: &Value) -> Value {
    match value {
        Value::Record(r) => {
            let mut rec = Record::new(r.name());
            rec.insert("value", r.field("value").unwrap().clone()).unwrap();
            let next = match r.field("next").unwrap() {
                Value::Null => Value::Null,
                rec @ Value::Record(_) => {
                    Value::Union("LongList".to_string(), Box::new(wrap_next_in_union(rec)))
                }
                other => other.clone(),
            };
            rec.insert("next", next).unwrap();
            Value::Record(rec)
        }
        other => other.clone(),
    }
}

fn main() -> Result<(), Error> {
    let schema = r##"
        {
            "type": "record",
            "name": "LongList",
            "aliases": ["LinkedLongs"],
            "fields" : [
              {"name": "value", "type": "long"},
              {"name": "next", "type": ["null", "LongList"]}
            ]
          }
        "##;

    let schema = Schema::from_str(schema)?;

    let value = LongList {
        value: 1i64,
        next: Some(Box::new(LongList {
            value: 2i64,
            next: Some(Box::new(LongList {
                value: 3i64,
                next: Some(Box::new(LongList {
                    value: 4i64,
                    next: Some(Box::new(LongList {
                        value: 5i64,
                        next: None,
                    })),
                })),
            })),
        })),
    };

    let avro_value = wrap_next_in_union(&to_value(&value)?);
    let buf = schema.to_buffer(&avro_value, false)?;

    let decoded = schema.from_buffer(&buf, false)?;
    let a: LongList = from_value(&decoded)?;
    dbg!(a);

    Ok(())
}
