use anyhow::Error;
use avrocodec::{from_value, Schema};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
struct Mentees {
    id: i32,
    username: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RustMentors {
    name: String,
    github_handle: String,
    active: bool,
    mentees: Mentees,
}

fn main() -> Result<(), Error> {
    let schema = Schema::from_str(
        r##"
            {
            "name": "rust_mentors",
            "type": "record",
            "fields": [
                {
                "name": "name",
                "type": "string"
                },
                {
                "name": "github_handle",
                "type": "string"
                },
                {
                "name": "active",
                "type": "boolean"
                },
                {
                    "name":"mentees",
                    "type": {
                        "name":"mentees",
                        "type": "record",
                        "fields": [
                            {"name":"id", "type": "int"},
                            {"name":"username", "type": "string"}
                        ]
                    }
                }
            ]
            }
"##,
    )?;

    // Build a Value straight out of JSON, using the schema to resolve
    // types a bare JSON parse can't express (field order, int vs long,
    // bytes-as-string, union branch tags).
    let json_data = r##"
    { "name": "bob",
        "github_handle":"ghbob",
        "active": true,
        "mentees":{"id":1, "username":"alice"} }"##;
    let rec = schema.from_json_str(json_data, false)?;

    let buf = schema.to_buffer(&rec, false)?;
    let decoded = schema.from_buffer(&buf, false)?;
    let mentors: RustMentors = from_value(&decoded)?;
    dbg!(mentors);

    Ok(())
}
