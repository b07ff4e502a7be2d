use anyhow::Error;
use avrocodec::Schema;
use std::str::FromStr;

fn main() -> Result<(), Error> {
    let schema = Schema::from_str(
        r##"
         {
             "type": "record",
             "name": "LongList",
             "aliases": ["LinkedLongs"],
             "fields" : [
                 {"name": "value", "type": "long"},
                 {"name": "next", "type": ["null", "LongList"]}
             ]
         }
     "##,
    )?;

    println!("{}", schema.canonical_form());
    // Rabin64 fingerprint of the canonical form, per the avro spec's
    // recommended default.
    dbg!(schema.canonical_form().rabin64());
    // MD5 fingerprint, also always available.
    dbg!(schema.canonical_form().md5());

    Ok(())
}
