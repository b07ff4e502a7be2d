//! A `serde`-based bridge between Rust values and [`Value`](crate::Value).
//!
//! This is a best-effort convenience layer: it has no access to a schema, so
//! it cannot choose union branches, enum types or distinguish `bytes` from
//! `fixed` the way [`Variant::from_json`](crate::Schema) can. Prefer
//! constructing [`Value`](crate::Value)/[`Record`](crate::Record) directly,
//! or going through JSON, whenever a schema is at hand.

mod de;
mod de_impl;
mod ser;
mod ser_impl;

pub(crate) use self::de::SerdeReader;
pub use self::ser::{to_value, SerdeWriter};
use crate::error::AvroError;
use crate::value::Value;
use serde::Deserialize;

/// Deserializes a Rust type out of an avro [`Value`].
pub fn from_value<'de, T>(value: &'de Value) -> Result<T, AvroError>
where
    T: Deserialize<'de>,
{
    let mut deserializer = SerdeReader::new(value);
    T::deserialize(&mut deserializer)
}
