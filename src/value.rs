//! The dynamic value representation accepted and produced by the codec.

use crate::error::AvroError;
use crate::schema::common::validate_name;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Convenient type alias for avro map values.
pub type Map = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// The [Record](https://avro.apache.org/docs/current/spec.html#schema_record) avro type.
/// Fields are kept in insertion order; `Schema::to_buffer` encodes them in
/// the order the writer schema declares, not the order they were inserted
/// here.
pub struct Record {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates a new, empty record value with the given name.
    pub fn new(name: &str) -> Self {
        Record {
            fields: IndexMap::new(),
            name: name.to_string(),
        }
    }

    /// Adds a field to the record.
    pub fn insert<T: Into<Value>>(&mut self, field_name: &str, value: T) -> Result<(), AvroError> {
        validate_name(0, field_name)?;
        self.fields.insert(field_name.to_string(), value.into());
        Ok(())
    }

    /// Creates a record from a [`BTreeMap`] by consuming it. Values must
    /// implement `Into<Value>`.
    pub fn from_btree<K: Into<String> + Ord + Display, V: Into<Value>>(
        name: &str,
        btree: BTreeMap<K, V>,
    ) -> Self {
        let mut record = Record::new(name);
        for (k, v) in btree {
            record.fields.insert(k.to_string(), v.into());
        }
        record
    }

    /// The record's schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field's value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Represents a dynamic Avro value.
///
/// A non-null union value is represented as `Value::Union(branch_tag,
/// inner)`, where `branch_tag` is the branch's canonical type name (a
/// primitive name, or a named type's fullname). A union value whose chosen
/// branch is `null` is represented as the bare `Value::Null`, never wrapped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// A null value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An i32 integer value.
    Int(i32),
    /// An i64 long value.
    Long(i64),
    /// An f32 float value.
    Float(f32),
    /// An f64 double value.
    Double(f64),
    /// A sequence of raw bytes.
    Bytes(Vec<u8>),
    /// A UTF-8 string.
    Str(String),
    /// A fixed-size sequence of raw bytes.
    Fixed(Vec<u8>),
    /// An enum symbol name.
    Enum(String),
    /// An array of values.
    Array(Vec<Value>),
    /// A map of string keys to values.
    Map(Map),
    /// A record value.
    Record(Record),
    /// A union value, tagged with the chosen branch's canonical type name.
    Union(String, Box<Value>),
}

///////////////////////////////////////////////////////////////////////////////
/// From impls for Value
///////////////////////////////////////////////////////////////////////////////

impl From<()> for Value {
    fn from(_v: ()) -> Value {
        Value::Null
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(v: HashMap<String, T>) -> Value {
        let mut map = HashMap::with_capacity(v.len());
        for (k, v) in v.into_iter() {
            map.insert(k, v.into());
        }
        Value::Map(map)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Bytes(value)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(value: &'a [u8]) -> Value {
        Value::Bytes(value.to_vec())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::Int(value)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Value {
        Value::Int(value as i32)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Value {
        Value::Int(value as i32)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Long(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Value {
        Value::Long(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Value {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Double(value)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Value {
        Value::Str(value.to_string())
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Value -> Rust value accessors
///////////////////////////////////////////////////////////////////////////////

impl Value {
    /// Try to retrieve an avro null.
    pub fn as_null(&self) -> Result<(), AvroError> {
        if let Value::Null = self {
            Ok(())
        } else {
            Err(AvroError::ExpectedVariantNotFound("null"))
        }
    }
    /// Try to retrieve an avro boolean.
    pub fn as_boolean(&self) -> Result<&bool, AvroError> {
        if let Value::Boolean(b) = self {
            Ok(b)
        } else {
            Err(AvroError::ExpectedVariantNotFound("boolean"))
        }
    }
    /// Try to retrieve an avro int.
    pub fn as_int(&self) -> Result<&i32, AvroError> {
        if let Value::Int(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("int"))
        }
    }
    /// Try to retrieve an avro long.
    pub fn as_long(&self) -> Result<&i64, AvroError> {
        if let Value::Long(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("long"))
        }
    }
    /// Try to retrieve an avro float.
    pub fn as_float(&self) -> Result<&f32, AvroError> {
        if let Value::Float(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("float"))
        }
    }
    /// Try to retrieve an avro double.
    pub fn as_double(&self) -> Result<&f64, AvroError> {
        if let Value::Double(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("double"))
        }
    }
    /// Try to retrieve avro bytes.
    pub fn as_bytes(&self) -> Result<&[u8], AvroError> {
        if let Value::Bytes(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("bytes"))
        }
    }
    /// Try to retrieve an avro string.
    pub fn as_string(&self) -> Result<&str, AvroError> {
        if let Value::Str(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("string"))
        }
    }
    /// Try to retrieve an avro record.
    pub fn as_record(&self) -> Result<&Record, AvroError> {
        if let Value::Record(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("record"))
        }
    }
    /// Try to retrieve the chosen enum symbol.
    pub fn as_enum(&self) -> Result<&str, AvroError> {
        if let Value::Enum(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("enum"))
        }
    }
    /// Try to retrieve an avro array.
    pub fn as_array(&self) -> Result<&[Value], AvroError> {
        if let Value::Array(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("array"))
        }
    }
    /// Try to retrieve an avro map.
    pub fn as_map(&self) -> Result<&HashMap<String, Value>, AvroError> {
        if let Value::Map(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("map"))
        }
    }
    /// Try to retrieve a union's branch tag and inner value.
    pub fn as_union(&self) -> Result<(&str, &Value), AvroError> {
        if let Value::Union(tag, v) = self {
            Ok((tag, v))
        } else {
            Err(AvroError::ExpectedVariantNotFound("union"))
        }
    }
    /// Try to retrieve an avro fixed value.
    pub fn as_fixed(&self) -> Result<&[u8], AvroError> {
        if let Value::Fixed(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound("fixed"))
        }
    }
}
