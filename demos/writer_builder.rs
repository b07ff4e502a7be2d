// Demonstrates resolving data written with an older schema against a newer
// one: the writer schema gains an `int` field the reader schema doesn't
// have (skipped), and the reader schema gains a `greeting` field the
// writer doesn't have (filled from its default).

use anyhow::Error;
use avrocodec::{Record, Schema, Value};
use std::str::FromStr;

fn main() -> Result<(), Error> {
    let writer_schema = Schema::from_str(
        r##"
        {
            "type": "record",
            "name": "Message",
            "fields": [
                {"name": "id", "type": "int"}
            ]
        }
        "##,
    )?;

    let reader_schema = Schema::from_str(
        r##"
        {
            "type": "record",
            "name": "Message",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "greeting", "type": "string", "default": "hello"}
            ]
        }
        "##,
    )?;

    let mut record = Record::new("Message");
    record.insert("id", 42)?;
    let buf = writer_schema.to_buffer(&Value::Record(record), false)?;

    let resolver = writer_schema.create_resolver(&reader_schema)?;
    let value = resolver.decode(&buf, false)?;
    dbg!(value);

    Ok(())
}
