//! A pure Rust implementation of the [Apache Avro specification](https://avro.apache.org/docs/current/spec.html)
//! type system: schema parsing, binary encoding/decoding, schema resolution,
//! canonical-form fingerprinting and JSON value ingestion/dump.
//!
//! ## Using the library
//!
//! Add avrocodec to your `Cargo.toml`:
//!```toml
//! [dependencies]
//! avrocodec = "0.1"
//!```
//! ## A hello world example of encoding and decoding a value
//!
//!```rust
//! use avrocodec::{Schema, Value};
//! use std::str::FromStr;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = Schema::from_str(r##""long""##)?;
//!     let buf = schema.to_buffer(&Value::Long(42), false)?;
//!     let value = schema.from_buffer(&buf, false)?;
//!     assert_eq!(value, Value::Long(42));
//!     Ok(())
//! }
//!```

#![deny(missing_docs)]
#![recursion_limit = "1024"]
#![deny(unused_must_use)]
#![deny(rust_2018_idioms)]

pub mod config;
mod error;
mod resolver;
mod schema;
mod serde_avro;
mod tap;
mod value;

pub use error::{AvroError, AvroResult};
pub use resolver::Resolver;
pub use schema::{CanonicalSchema, CloneOptions, Order, ParserConfig, Schema};
pub use serde_avro::{from_value, to_value};
pub use value::{Record, Value};
