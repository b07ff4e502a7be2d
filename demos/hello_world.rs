// A hello world example of encoding and decoding an avro value.

use anyhow::Error;
use avrocodec::{from_value, Schema};
use std::str::FromStr;

fn main() -> Result<(), Error> {
    // Create a schema.
    let schema = Schema::from_str(r##""null""##)?;

    // Encode a value against it, producing the avro binary encoding.
    let buf = schema.to_buffer(&avrocodec::Value::Null, false)?;

    // Decode it back.
    let value = schema.from_buffer(&buf, false)?;
    dbg!(&value);

    // Or convert it straight to a native Rust type using `from_value`,
    // which uses serde underneath.
    let _val: () = from_value(&value)?;

    Ok(())
}
