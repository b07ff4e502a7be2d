//! Contains routines for parsing and validating an Avro schema, and the
//! [`Variant`] tree that drives encoding, decoding, validation, JSON
//! ingestion/dump, cloning and random-value generation.
//!
//! Schemas in avro are written as JSON and can be parsed from a string or a
//! `.avsc` file.

pub mod common;
#[cfg(test)]
mod tests;
use crate::error::AvroError;
pub use common::Order;
mod canonical;
pub mod parser;
pub use parser::ParserConfig;
pub(crate) use parser::Registry;

use crate::error::AvroResult;
use crate::tap::Tap;
use crate::value::{Record, Value};
use canonical::normalize_schema;
pub use canonical::CanonicalSchema;
use common::{Field, Name};
use indexmap::IndexMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{self, json, Value as JsonValue};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Variant {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    Str,
    Record {
        name: Name,
        aliases: Option<Vec<String>>,
        fields: IndexMap<String, Field>,
    },
    Fixed {
        name: Name,
        size: usize,
    },
    Enum {
        name: Name,
        aliases: Option<Vec<String>>,
        symbols: Vec<String>,
    },
    Map {
        values: Box<Variant>,
    },
    Array {
        items: Box<Variant>,
    },
    Union {
        variants: Vec<Variant>,
    },
    Named(String),
}

/// Options controlling [`Schema::clone_value`].
pub struct CloneOptions<'a> {
    /// Accept a JSON array of 0-255 integers as an alternate representation
    /// for `bytes`/`fixed` inputs, in addition to the always-accepted
    /// code-point string form. Has no effect on already-typed [`Value`]s.
    pub coerce_buffers: bool,
    /// When cloning a value against a union schema where the value itself
    /// is not already a tagged `Value::Union`, wrap it in the first
    /// compatible branch's tag instead of failing.
    pub wrap_unions: bool,
    /// Called with `(field_name, field_value)` before a record field is
    /// cloned. Returning `Some(v)` substitutes `v` for the field's value.
    pub field_hook: Option<&'a dyn Fn(&str, &Value) -> Option<Value>>,
}

impl<'a> Default for CloneOptions<'a> {
    fn default() -> Self {
        CloneOptions {
            coerce_buffers: false,
            wrap_unions: false,
            field_hook: None,
        }
    }
}

/// Represents a parsed, validated avro schema.
#[derive(Debug)]
pub struct Schema {
    inner: JsonValue,
    // Schema context that has a lookup table to resolve named schema references
    pub(crate) cxt: Registry,
    // typed and stripped version of schema used internally.
    pub(crate) variant: Variant,
    // canonical form of schema. This is used for equality.
    pub(crate) canonical: CanonicalSchema,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl std::str::FromStr for Schema {
    type Err = AvroError;
    /// Parse an avro schema from a JSON string.
    /// One can use Rust's raw string syntax (r##""##) to pass schema.
    fn from_str(schema: &str) -> Result<Self, Self::Err> {
        let schema_json = serde_json::from_str(schema).map_err(AvroError::SchemaJson)?;
        Schema::parse_with(schema_json, ParserConfig::default())
    }
}

impl Schema {
    /// Parses an avro schema from a JSON schema in a file.
    pub fn from_path<P: AsRef<Path> + Debug>(path: P) -> AvroResult<Self> {
        let schema_file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(AvroError::SchemaIo)?;
        let value = serde_json::from_reader(schema_file).map_err(AvroError::SchemaJson)?;
        Schema::parse_with(value, ParserConfig::default())
    }

    /// Parses an avro schema from a JSON string using a custom
    /// [`ParserConfig`] (e.g. to supply a default namespace or a
    /// type-parsed callback).
    pub fn from_str_with_config(schema: &str, config: ParserConfig) -> AvroResult<Self> {
        let schema_json = serde_json::from_str(schema).map_err(AvroError::SchemaJson)?;
        Schema::parse_with(schema_json, config)
    }

    fn parse_with(schema_json: JsonValue, config: ParserConfig) -> AvroResult<Self> {
        let mut parser = Registry::with_config(config.clone());
        let pcf = CanonicalSchema(normalize_schema(&schema_json)?);
        let variant = parser.parse_schema(&schema_json, config.namespace.as_deref())?;
        Ok(Schema {
            inner: schema_json,
            cxt: parser,
            variant,
            canonical: pcf,
        })
    }

    pub(crate) fn as_bytes(&self) -> Vec<u8> {
        format!("{}", self.inner).into_bytes()
    }

    pub(crate) fn variant(&self) -> &Variant {
        &self.variant
    }

    #[inline(always)]
    pub(crate) fn validate(&self, value: &Value) -> AvroResult<()> {
        self.variant.validate(value, &self.cxt)
    }

    /// Returns the canonical form of an Avro schema.
    pub fn canonical_form(&self) -> &CanonicalSchema {
        &self.canonical
    }

    /// Encodes `value` into a fresh buffer of avro binary data. Grows the
    /// internal buffer and retries on overflow.
    ///
    /// If `lax` is `false`, `value` is validated against this schema before
    /// any bytes are written, and an invalid value fails without touching
    /// the tap. If `lax` is `true`, validation is skipped and encoding goes
    /// straight to the tap; a value that doesn't match the schema either
    /// encodes nonsense or trips the tap's overflow flag, which still
    /// surfaces as an error, just after doing the work instead of before.
    pub fn to_buffer(&self, value: &Value, lax: bool) -> AvroResult<Vec<u8>> {
        if !lax {
            self.validate(value)?;
        }
        let mut capacity = crate::config::INITIAL_BUFFER_RESERVE;
        loop {
            let mut tap = Tap::for_writing(capacity);
            self.variant.encode(value, &self.cxt, &mut tap)?;
            if tap.is_valid() {
                return Ok(tap.written().to_vec());
            }
            capacity *= 2;
        }
    }

    /// Decodes a single value of this schema's shape from `bytes`.
    ///
    /// If `allow_trailing` is `false`, every byte of `bytes` must be
    /// consumed by the decode; leftover bytes fail with
    /// [`AvroError::Truncated`]. If `allow_trailing` is `true`, bytes past
    /// the decoded value are ignored, which is useful when `bytes` is a
    /// slice into a larger stream.
    pub fn from_buffer(&self, bytes: &[u8], allow_trailing: bool) -> AvroResult<Value> {
        let mut tap = Tap::for_reading(bytes);
        let value = self.variant.decode(&self.cxt, &mut tap)?;
        if !tap.is_valid() {
            return Err(AvroError::Truncated);
        }
        if !allow_trailing && !tap.at_end() {
            return Err(AvroError::Truncated);
        }
        Ok(value)
    }

    /// Parses a JSON-encoded avro value (as produced by [`Schema::to_json_string`]).
    pub fn from_json_str(&self, text: &str, coerce_buffers: bool) -> AvroResult<Value> {
        let json: JsonValue = serde_json::from_str(text).map_err(AvroError::SchemaJson)?;
        self.variant.from_json(&json, &self.cxt, coerce_buffers)
    }

    /// Converts an already-parsed `serde_json::Value` into an avro [`Value`].
    pub fn from_json_value(&self, json: &JsonValue, coerce_buffers: bool) -> AvroResult<Value> {
        self.variant.from_json(json, &self.cxt, coerce_buffers)
    }

    /// Dumps a [`Value`] back to its JSON-ish string form: bytes/fixed
    /// become code-point strings and unions become single-key mappings.
    pub fn to_json_string(&self, value: &Value) -> AvroResult<String> {
        let json = self.variant.to_json(value, &self.cxt)?;
        serde_json::to_string(&json).map_err(AvroError::SchemaJson)
    }

    /// Deep-clones `value`, optionally coercing buffer representations,
    /// wrapping bare union values, and rewriting fields via a hook.
    pub fn clone_value(&self, value: &Value, opts: &CloneOptions<'_>) -> AvroResult<Value> {
        self.variant.clone_value(value, &self.cxt, opts)
    }

    /// Generates a random value conforming to this schema. Intended for
    /// test fixtures; recursive named types are bounded to a fixed depth.
    pub fn random(&self) -> Value {
        let mut rng = rand::thread_rng();
        self.variant.random(&self.cxt, &mut rng, 0)
    }

    /// Compiles a reusable resolver that decodes data written with this
    /// schema into `reader`'s shape.
    pub fn create_resolver(&self, reader: &Schema) -> AvroResult<crate::resolver::Resolver> {
        crate::resolver::Resolver::compile(self, reader)
    }
}

fn code_points_to_bytes(s: &str) -> AvroResult<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        let cp = c as u32;
        if cp > 255 {
            return Err(AvroError::DefaultValueParse);
        }
        out.push(cp as u8);
    }
    Ok(out)
}

fn json_int_array_to_bytes(a: &[JsonValue]) -> AvroResult<Vec<u8>> {
    let mut out = Vec::with_capacity(a.len());
    for v in a {
        let n = v.as_u64().ok_or(AvroError::DefaultValueParse)?;
        if n > 255 {
            return Err(AvroError::DefaultValueParse);
        }
        out.push(n as u8);
    }
    Ok(out)
}

fn bytes_to_code_point_string(b: &[u8]) -> String {
    b.iter().map(|&byte| byte as char).collect()
}

impl Variant {
    /// The canonical type name used as a union branch tag: a primitive
    /// name, `array`/`map`, or a named type's fullname.
    pub(crate) fn type_name(&self) -> String {
        match self {
            Variant::Null => "null".to_string(),
            Variant::Boolean => "boolean".to_string(),
            Variant::Int => "int".to_string(),
            Variant::Long => "long".to_string(),
            Variant::Float => "float".to_string(),
            Variant::Double => "double".to_string(),
            Variant::Bytes => "bytes".to_string(),
            Variant::Str => "string".to_string(),
            Variant::Record { name, .. } => name.fullname(),
            Variant::Fixed { name, .. } => name.fullname(),
            Variant::Enum { name, .. } => name.fullname(),
            Variant::Map { .. } => "map".to_string(),
            Variant::Array { .. } => "array".to_string(),
            Variant::Union { .. } => "union".to_string(),
            Variant::Named(n) => n.clone(),
        }
    }

    fn kind_tag(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Boolean => "boolean",
            Variant::Int => "int",
            Variant::Long => "long",
            Variant::Float => "float",
            Variant::Double => "double",
            Variant::Bytes => "bytes",
            Variant::Str => "string",
            Variant::Record { .. } => "record",
            Variant::Fixed { .. } => "fixed",
            Variant::Enum { .. } => "enum",
            Variant::Map { .. } => "map",
            Variant::Array { .. } => "array",
            Variant::Union { .. } => "union",
            Variant::Named(_) => "named",
        }
    }

    /// A key distinguishing union branches "of the same kind" per the avro
    /// spec's no-ambiguous-union rule: two named types of the same kind
    /// collide only if they share a fullname, but e.g. `record` and `fixed`
    /// never collide.
    pub(crate) fn branch_kind_key(&self) -> String {
        match self {
            Variant::Record { name, .. } | Variant::Fixed { name, .. } | Variant::Enum { name, .. } => {
                format!("{}:{}", self.kind_tag(), name.fullname())
            }
            Variant::Named(n) => format!("named:{}", n),
            other => other.kind_tag().to_string(),
        }
    }

    fn get_named_mut(&mut self) -> Option<&mut Name> {
        match self {
            Variant::Record { name, .. }
            | Variant::Fixed { name, .. }
            | Variant::Enum { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn validate(&self, value: &Value, cxt: &Registry) -> AvroResult<()> {
        match (value, self) {
            (Value::Null, Variant::Null) => Ok(()),
            (Value::Boolean(_), Variant::Boolean) => Ok(()),
            (Value::Int(_), Variant::Int) => Ok(()),
            (Value::Long(_), Variant::Long)
            | (Value::Long(_), Variant::Float)
            | (Value::Long(_), Variant::Double)
            | (Value::Int(_), Variant::Long)
            | (Value::Int(_), Variant::Float)
            | (Value::Int(_), Variant::Double)
            | (Value::Float(_), Variant::Float)
            | (Value::Float(_), Variant::Double)
            | (Value::Double(_), Variant::Double)
            | (Value::Str(_), Variant::Str)
            | (Value::Str(_), Variant::Bytes)
            | (Value::Bytes(_), Variant::Str)
            | (Value::Bytes(_), Variant::Bytes) => Ok(()),
            (Value::Fixed(v), Variant::Fixed { size, .. })
            | (Value::Bytes(v), Variant::Fixed { size, .. }) => {
                if v.len() != *size {
                    Err(AvroError::FixedValueLenMismatch {
                        found: v.len(),
                        expected: *size,
                    })
                } else {
                    Ok(())
                }
            }
            (Value::Record(rec), Variant::Record { fields, .. }) => {
                for (fname, field) in fields {
                    if let Some(fvalue) = rec.fields.get(fname) {
                        field.ty.validate(fvalue, cxt)?;
                    } else if field.default.is_none() {
                        return Err(AvroError::RecordFieldMissing(fname.clone()));
                    }
                }
                for fname in rec.fields.keys() {
                    if !fields.contains_key(fname) {
                        return Err(AvroError::UnexpectedRecordField(fname.clone()));
                    }
                }
                Ok(())
            }
            (Value::Map(hmap), Variant::Map { values }) => {
                for v in hmap.values() {
                    values.validate(v, cxt)?;
                }
                Ok(())
            }
            (Value::Enum(sym), Variant::Enum { symbols, .. }) => {
                if symbols.contains(sym) {
                    Ok(())
                } else {
                    Err(AvroError::UnknownEnumSymbol(sym.clone()))
                }
            }
            (Value::Array(items), Variant::Array { items: item_ty }) => {
                for v in items {
                    item_ty.validate(v, cxt)?;
                }
                Ok(())
            }
            (v, Variant::Named(name)) => {
                let schema = cxt
                    .get(name)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
                schema.validate(v, cxt)
            }
            (Value::Null, Variant::Union { variants }) => {
                if variants.iter().any(|v| matches!(v, Variant::Null)) {
                    Ok(())
                } else {
                    Err(AvroError::NotFoundInUnion)
                }
            }
            (Value::Union(tag, inner), Variant::Union { variants }) => {
                for v in variants {
                    if &v.type_name() == tag {
                        return v.validate(inner, cxt);
                    }
                }
                Err(AvroError::UnknownUnionBranch(tag.clone()))
            }
            (_v, _s) => Err(AvroError::SchemaDataMismatch),
        }
    }

    pub(crate) fn is_valid(&self, value: &Value, cxt: &Registry) -> bool {
        self.validate(value, cxt).is_ok()
    }

    pub(crate) fn encode(&self, value: &Value, cxt: &Registry, tap: &mut Tap) -> AvroResult<()> {
        match (self, value) {
            (Variant::Null, Value::Null) => Ok(()),
            (Variant::Boolean, Value::Boolean(b)) => {
                tap.write_boolean(*b);
                Ok(())
            }
            (Variant::Int, Value::Int(v)) => {
                tap.write_int(*v);
                Ok(())
            }
            (Variant::Long, Value::Long(v)) => {
                tap.write_long(*v);
                Ok(())
            }
            (Variant::Long, Value::Int(v)) => {
                tap.write_long(i64::from(*v));
                Ok(())
            }
            (Variant::Float, Value::Float(v)) => {
                tap.write_float(*v);
                Ok(())
            }
            (Variant::Float, Value::Int(v)) => {
                tap.write_float(*v as f32);
                Ok(())
            }
            (Variant::Float, Value::Long(v)) => {
                tap.write_float(*v as f32);
                Ok(())
            }
            (Variant::Double, Value::Double(v)) => {
                tap.write_double(*v);
                Ok(())
            }
            (Variant::Double, Value::Int(v)) => {
                tap.write_double(f64::from(*v));
                Ok(())
            }
            (Variant::Double, Value::Long(v)) => {
                tap.write_double(*v as f64);
                Ok(())
            }
            (Variant::Double, Value::Float(v)) => {
                tap.write_double(f64::from(*v));
                Ok(())
            }
            (Variant::Bytes, Value::Bytes(b)) => {
                tap.write_bytes(b);
                Ok(())
            }
            (Variant::Bytes, Value::Str(s)) => {
                tap.write_bytes(s.as_bytes());
                Ok(())
            }
            (Variant::Str, Value::Str(s)) => {
                tap.write_string(s);
                Ok(())
            }
            (Variant::Str, Value::Bytes(b)) => {
                let s = std::str::from_utf8(b).map_err(|_| AvroError::InvalidUtf8)?;
                tap.write_string(s);
                Ok(())
            }
            (Variant::Fixed { size, .. }, Value::Fixed(b))
            | (Variant::Fixed { size, .. }, Value::Bytes(b)) => {
                if b.len() != *size {
                    return Err(AvroError::FixedValueLenMismatch {
                        found: b.len(),
                        expected: *size,
                    });
                }
                tap.write_fixed(b);
                Ok(())
            }
            (Variant::Enum { symbols, .. }, Value::Enum(sym)) => {
                let idx = symbols
                    .iter()
                    .position(|s| s == sym)
                    .ok_or_else(|| AvroError::UnknownEnumSymbol(sym.clone()))?;
                tap.write_int(idx as i32);
                Ok(())
            }
            (Variant::Array { items }, Value::Array(arr)) => {
                if !arr.is_empty() {
                    tap.write_long(arr.len() as i64);
                    for item in arr {
                        items.encode(item, cxt, tap)?;
                    }
                }
                tap.write_long(0);
                Ok(())
            }
            (Variant::Map { values }, Value::Map(map)) => {
                if !map.is_empty() {
                    tap.write_long(map.len() as i64);
                    for (k, v) in map {
                        tap.write_string(k);
                        values.encode(v, cxt, tap)?;
                    }
                }
                tap.write_long(0);
                Ok(())
            }
            (Variant::Record { fields, .. }, Value::Record(rec)) => {
                for (fname, field) in fields {
                    if let Some(v) = rec.fields.get(fname) {
                        field.ty.encode(v, cxt, tap)?;
                    } else if let Some(default) = &field.default {
                        field.ty.encode(default, cxt, tap)?;
                    } else {
                        return Err(AvroError::RecordFieldMissing(fname.clone()));
                    }
                }
                Ok(())
            }
            (Variant::Named(n), v) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.encode(v, cxt, tap)
            }
            (Variant::Union { variants }, Value::Null) => {
                let idx = variants
                    .iter()
                    .position(|v| matches!(v, Variant::Null))
                    .ok_or(AvroError::NotFoundInUnion)?;
                tap.write_int(idx as i32);
                Ok(())
            }
            (Variant::Union { variants }, Value::Union(tag, inner)) => {
                let idx = variants
                    .iter()
                    .position(|v| &v.type_name() == tag)
                    .ok_or_else(|| AvroError::UnknownUnionBranch(tag.clone()))?;
                tap.write_int(idx as i32);
                variants[idx].encode(inner, cxt, tap)
            }
            (_s, _v) => Err(AvroError::SchemaDataMismatch),
        }
    }

    pub(crate) fn decode(&self, cxt: &Registry, tap: &mut Tap) -> AvroResult<Value> {
        match self {
            Variant::Null => Ok(Value::Null),
            Variant::Boolean => match tap.read_boolean() {
                0 => Ok(Value::Boolean(false)),
                1 => Ok(Value::Boolean(true)),
                other => Err(AvroError::InvalidBooleanByte(other)),
            },
            Variant::Int => Ok(Value::Int(tap.read_int())),
            Variant::Long => Ok(Value::Long(tap.read_long())),
            Variant::Float => Ok(Value::Float(tap.read_float())),
            Variant::Double => Ok(Value::Double(tap.read_double())),
            Variant::Bytes => tap.read_bytes().map(Value::Bytes).ok_or(AvroError::Truncated),
            Variant::Str => tap.read_string().map(Value::Str).ok_or(AvroError::InvalidUtf8),
            Variant::Fixed { size, .. } => Ok(Value::Fixed(tap.read_fixed(*size))),
            Variant::Enum { symbols, .. } => {
                let idx = tap.read_int();
                if idx < 0 {
                    return Err(AvroError::EnumOrdinalOutOfRange(idx as usize));
                }
                symbols
                    .get(idx as usize)
                    .cloned()
                    .map(Value::Enum)
                    .ok_or(AvroError::EnumOrdinalOutOfRange(idx as usize))
            }
            Variant::Array { items } => {
                let mut out = vec![];
                loop {
                    let count = tap.read_long();
                    if count == 0 {
                        break;
                    }
                    let count = if count < 0 {
                        let _byte_len = tap.read_long();
                        -count
                    } else {
                        count
                    };
                    for _ in 0..count {
                        out.push(items.decode(cxt, tap)?);
                    }
                }
                Ok(Value::Array(out))
            }
            Variant::Map { values } => {
                let mut out = HashMap::new();
                loop {
                    let count = tap.read_long();
                    if count == 0 {
                        break;
                    }
                    let count = if count < 0 {
                        let _byte_len = tap.read_long();
                        -count
                    } else {
                        count
                    };
                    for _ in 0..count {
                        let k = tap.read_string().ok_or(AvroError::InvalidUtf8)?;
                        let v = values.decode(cxt, tap)?;
                        out.insert(k, v);
                    }
                }
                Ok(Value::Map(out))
            }
            Variant::Record { name, fields, .. } => {
                let mut rec = Record::new(&name.fullname());
                for (fname, field) in fields {
                    let v = field.ty.decode(cxt, tap)?;
                    rec.fields.insert(fname.clone(), v);
                }
                Ok(Value::Record(rec))
            }
            Variant::Union { variants } => {
                let idx = tap.read_int();
                if idx < 0 {
                    return Err(AvroError::EnumOrdinalOutOfRange(idx as usize));
                }
                let branch = variants
                    .get(idx as usize)
                    .ok_or(AvroError::EnumOrdinalOutOfRange(idx as usize))?;
                if matches!(branch, Variant::Null) {
                    branch.decode(cxt, tap)
                } else {
                    let tag = branch.type_name();
                    let inner = branch.decode(cxt, tap)?;
                    Ok(Value::Union(tag, Box::new(inner)))
                }
            }
            Variant::Named(n) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.decode(cxt, tap)
            }
        }
    }

    pub(crate) fn skip(&self, cxt: &Registry, tap: &mut Tap) -> AvroResult<()> {
        match self {
            Variant::Null => Ok(()),
            Variant::Boolean => {
                tap.read_boolean();
                Ok(())
            }
            Variant::Int => {
                tap.read_int();
                Ok(())
            }
            Variant::Long => {
                tap.read_long();
                Ok(())
            }
            Variant::Float => {
                tap.read_float();
                Ok(())
            }
            Variant::Double => {
                tap.read_double();
                Ok(())
            }
            Variant::Bytes | Variant::Str => {
                let len = tap.read_long();
                if len < 0 {
                    return Err(AvroError::NegativeLength);
                }
                tap.skip_raw(len as usize);
                Ok(())
            }
            Variant::Fixed { size, .. } => {
                tap.skip_raw(*size);
                Ok(())
            }
            Variant::Enum { .. } => {
                tap.read_int();
                Ok(())
            }
            Variant::Array { items } => {
                loop {
                    let count = tap.read_long();
                    if count == 0 {
                        break;
                    }
                    if count < 0 {
                        let byte_len = tap.read_long();
                        tap.skip_raw(byte_len as usize);
                    } else {
                        for _ in 0..count {
                            items.skip(cxt, tap)?;
                        }
                    }
                }
                Ok(())
            }
            Variant::Map { values } => {
                loop {
                    let count = tap.read_long();
                    if count == 0 {
                        break;
                    }
                    if count < 0 {
                        let byte_len = tap.read_long();
                        tap.skip_raw(byte_len as usize);
                    } else {
                        for _ in 0..count {
                            Variant::Str.skip(cxt, tap)?;
                            values.skip(cxt, tap)?;
                        }
                    }
                }
                Ok(())
            }
            Variant::Record { fields, .. } => {
                for field in fields.values() {
                    field.ty.skip(cxt, tap)?;
                }
                Ok(())
            }
            Variant::Union { variants } => {
                let idx = tap.read_int();
                if idx < 0 {
                    return Err(AvroError::EnumOrdinalOutOfRange(idx as usize));
                }
                let branch = variants
                    .get(idx as usize)
                    .ok_or(AvroError::EnumOrdinalOutOfRange(idx as usize))?;
                branch.skip(cxt, tap)
            }
            Variant::Named(n) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.skip(cxt, tap)
            }
        }
    }

    pub(crate) fn from_json(
        &self,
        json: &JsonValue,
        cxt: &Registry,
        coerce_buffers: bool,
    ) -> AvroResult<Value> {
        match (self, json) {
            (Variant::Null, JsonValue::Null) => Ok(Value::Null),
            (Variant::Boolean, JsonValue::Bool(b)) => Ok(Value::Boolean(*b)),
            (Variant::Int, JsonValue::Number(n)) => Ok(Value::Int(
                n.as_i64().ok_or(AvroError::DefaultValueParse)? as i32,
            )),
            (Variant::Long, JsonValue::Number(n)) => {
                Ok(Value::Long(n.as_i64().ok_or(AvroError::DefaultValueParse)?))
            }
            (Variant::Float, JsonValue::Number(n)) => Ok(Value::Float(
                n.as_f64().ok_or(AvroError::DefaultValueParse)? as f32,
            )),
            (Variant::Double, JsonValue::Number(n)) => {
                Ok(Value::Double(n.as_f64().ok_or(AvroError::DefaultValueParse)?))
            }
            (Variant::Str, JsonValue::String(s)) => Ok(Value::Str(s.clone())),
            (Variant::Bytes, JsonValue::String(s)) => Ok(Value::Bytes(code_points_to_bytes(s)?)),
            (Variant::Bytes, JsonValue::Array(a)) if coerce_buffers => {
                Ok(Value::Bytes(json_int_array_to_bytes(a)?))
            }
            (Variant::Fixed { size, .. }, JsonValue::String(s)) => {
                let bytes = code_points_to_bytes(s)?;
                if bytes.len() != *size {
                    return Err(AvroError::FixedValueLenMismatch {
                        found: bytes.len(),
                        expected: *size,
                    });
                }
                Ok(Value::Fixed(bytes))
            }
            (Variant::Fixed { size, .. }, JsonValue::Array(a)) if coerce_buffers => {
                let bytes = json_int_array_to_bytes(a)?;
                if bytes.len() != *size {
                    return Err(AvroError::FixedValueLenMismatch {
                        found: bytes.len(),
                        expected: *size,
                    });
                }
                Ok(Value::Fixed(bytes))
            }
            (Variant::Enum { symbols, .. }, JsonValue::String(s)) => {
                if symbols.contains(s) {
                    Ok(Value::Enum(s.clone()))
                } else {
                    Err(AvroError::UnknownEnumSymbol(s.clone()))
                }
            }
            (Variant::Array { items }, JsonValue::Array(a)) => {
                let mut out = Vec::with_capacity(a.len());
                for v in a {
                    out.push(items.from_json(v, cxt, coerce_buffers)?);
                }
                Ok(Value::Array(out))
            }
            (Variant::Map { values }, JsonValue::Object(m)) => {
                let mut out = HashMap::with_capacity(m.len());
                for (k, v) in m {
                    out.insert(k.clone(), values.from_json(v, cxt, coerce_buffers)?);
                }
                Ok(Value::Map(out))
            }
            (Variant::Record { name, fields, .. }, JsonValue::Object(m)) => {
                let mut rec = Record::new(&name.fullname());
                for (fname, field) in fields {
                    if let Some(v) = m.get(fname) {
                        rec.fields
                            .insert(fname.clone(), field.ty.from_json(v, cxt, coerce_buffers)?);
                    } else if let Some(default) = &field.default {
                        rec.fields.insert(fname.clone(), default.clone());
                    } else {
                        return Err(AvroError::RecordFieldMissing(fname.clone()));
                    }
                }
                Ok(Value::Record(rec))
            }
            (Variant::Named(n), json) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.from_json(json, cxt, coerce_buffers)
            }
            (Variant::Union { variants }, JsonValue::Null)
                if variants.iter().any(|v| matches!(v, Variant::Null)) =>
            {
                Ok(Value::Null)
            }
            (Variant::Union { variants }, JsonValue::Object(m)) if m.len() == 1 => {
                let (tag, inner_json) = m.iter().next().unwrap();
                for v in variants {
                    if &v.type_name() == tag {
                        let value = v.from_json(inner_json, cxt, coerce_buffers)?;
                        return Ok(Value::Union(tag.clone(), Box::new(value)));
                    }
                }
                Err(AvroError::UnknownUnionBranch(tag.clone()))
            }
            _ => Err(AvroError::DefaultValueParse),
        }
    }

    pub(crate) fn to_json(&self, value: &Value, cxt: &Registry) -> AvroResult<JsonValue> {
        match (self, value) {
            (Variant::Null, Value::Null) => Ok(JsonValue::Null),
            (Variant::Boolean, Value::Boolean(b)) => Ok(json!(b)),
            (Variant::Int, Value::Int(v)) => Ok(json!(v)),
            (Variant::Long, Value::Long(v)) => Ok(json!(v)),
            (Variant::Float, Value::Float(v)) => Ok(json!(v)),
            (Variant::Double, Value::Double(v)) => Ok(json!(v)),
            (Variant::Str, Value::Str(s)) => Ok(json!(s)),
            (Variant::Bytes, Value::Bytes(b)) => Ok(json!(bytes_to_code_point_string(b))),
            (Variant::Fixed { .. }, Value::Fixed(b)) => Ok(json!(bytes_to_code_point_string(b))),
            (Variant::Fixed { .. }, Value::Bytes(b)) => Ok(json!(bytes_to_code_point_string(b))),
            (Variant::Enum { .. }, Value::Enum(s)) => Ok(json!(s)),
            (Variant::Array { items }, Value::Array(a)) => {
                let mut out = Vec::with_capacity(a.len());
                for v in a {
                    out.push(items.to_json(v, cxt)?);
                }
                Ok(JsonValue::Array(out))
            }
            (Variant::Map { values }, Value::Map(m)) => {
                let mut out = serde_json::Map::with_capacity(m.len());
                for (k, v) in m {
                    out.insert(k.clone(), values.to_json(v, cxt)?);
                }
                Ok(JsonValue::Object(out))
            }
            (Variant::Record { fields, .. }, Value::Record(rec)) => {
                let mut out = serde_json::Map::with_capacity(fields.len());
                for (fname, field) in fields {
                    let v = rec
                        .fields
                        .get(fname)
                        .ok_or_else(|| AvroError::RecordFieldMissing(fname.clone()))?;
                    out.insert(fname.clone(), field.ty.to_json(v, cxt)?);
                }
                Ok(JsonValue::Object(out))
            }
            (Variant::Named(n), v) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.to_json(v, cxt)
            }
            (Variant::Union { .. }, Value::Null) => Ok(JsonValue::Null),
            (Variant::Union { variants }, Value::Union(tag, inner)) => {
                let branch = variants
                    .iter()
                    .find(|v| &v.type_name() == tag)
                    .ok_or_else(|| AvroError::UnknownUnionBranch(tag.clone()))?;
                let mut m = serde_json::Map::with_capacity(1);
                m.insert(tag.clone(), branch.to_json(inner, cxt)?);
                Ok(JsonValue::Object(m))
            }
            _ => Err(AvroError::SchemaDataMismatch),
        }
    }

    pub(crate) fn clone_value(
        &self,
        value: &Value,
        cxt: &Registry,
        opts: &CloneOptions<'_>,
    ) -> AvroResult<Value> {
        match (self, value) {
            (Variant::Record { fields, .. }, Value::Record(rec)) => {
                let mut out = Record::new(&rec.name);
                for (fname, field) in fields {
                    let v = rec
                        .fields
                        .get(fname)
                        .ok_or_else(|| AvroError::RecordFieldMissing(fname.clone()))?;
                    let v = match opts.field_hook {
                        Some(hook) => hook(fname, v).unwrap_or_else(|| v.clone()),
                        None => v.clone(),
                    };
                    let cloned = field.ty.clone_value(&v, cxt, opts)?;
                    out.fields.insert(fname.clone(), cloned);
                }
                Ok(Value::Record(out))
            }
            (Variant::Array { items }, Value::Array(a)) => {
                let mut out = Vec::with_capacity(a.len());
                for v in a {
                    out.push(items.clone_value(v, cxt, opts)?);
                }
                Ok(Value::Array(out))
            }
            (Variant::Map { values }, Value::Map(m)) => {
                let mut out = HashMap::with_capacity(m.len());
                for (k, v) in m {
                    out.insert(k.clone(), values.clone_value(v, cxt, opts)?);
                }
                Ok(Value::Map(out))
            }
            (Variant::Named(n), v) => {
                let inner = cxt
                    .get(n)
                    .ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone()))?
                    .clone();
                inner.clone_value(v, cxt, opts)
            }
            (Variant::Union { .. }, Value::Null) => Ok(Value::Null),
            (Variant::Union { variants }, Value::Union(tag, inner)) => {
                let branch = variants
                    .iter()
                    .find(|v| &v.type_name() == tag)
                    .ok_or_else(|| AvroError::UnknownUnionBranch(tag.clone()))?;
                Ok(Value::Union(
                    tag.clone(),
                    Box::new(branch.clone_value(inner, cxt, opts)?),
                ))
            }
            (Variant::Union { variants }, v) if opts.wrap_unions => {
                for branch in variants {
                    if branch.is_valid(v, cxt) {
                        let tag = branch.type_name();
                        return Ok(Value::Union(tag, Box::new(branch.clone_value(v, cxt, opts)?)));
                    }
                }
                Err(AvroError::NotFoundInUnion)
            }
            _ => Ok(value.clone()),
        }
    }

    pub(crate) fn random(&self, cxt: &Registry, rng: &mut impl Rng, depth: usize) -> Value {
        const MAX_DEPTH: usize = 6;
        match self {
            Variant::Null => Value::Null,
            Variant::Boolean => Value::Boolean(rng.gen()),
            Variant::Int => Value::Int(rng.gen()),
            Variant::Long => Value::Long(rng.gen()),
            Variant::Float => Value::Float(rng.gen()),
            Variant::Double => Value::Double(rng.gen()),
            Variant::Bytes => {
                let n = rng.gen_range(0..16);
                Value::Bytes((0..n).map(|_| rng.gen()).collect())
            }
            Variant::Str => {
                let n = rng.gen_range(0..12);
                let s: String = (0..n).map(|_| rng.sample(Alphanumeric) as char).collect();
                Value::Str(s)
            }
            Variant::Fixed { size, .. } => Value::Fixed((0..*size).map(|_| rng.gen()).collect()),
            Variant::Enum { symbols, .. } => {
                let idx = rng.gen_range(0..symbols.len());
                Value::Enum(symbols[idx].clone())
            }
            Variant::Array { items } => {
                if depth >= MAX_DEPTH {
                    return Value::Array(vec![]);
                }
                let n = rng.gen_range(0..4);
                Value::Array((0..n).map(|_| items.random(cxt, rng, depth + 1)).collect())
            }
            Variant::Map { values } => {
                if depth >= MAX_DEPTH {
                    return Value::Map(HashMap::new());
                }
                let n = rng.gen_range(0..4);
                let mut m = HashMap::with_capacity(n);
                for i in 0..n {
                    m.insert(format!("k{}", i), values.random(cxt, rng, depth + 1));
                }
                Value::Map(m)
            }
            Variant::Record { name, fields, .. } => {
                let mut rec = Record::new(&name.fullname());
                for (fname, field) in fields {
                    rec.fields
                        .insert(fname.clone(), field.ty.random(cxt, rng, depth + 1));
                }
                Value::Record(rec)
            }
            Variant::Union { variants } => {
                if depth >= MAX_DEPTH {
                    if variants.iter().any(|v| matches!(v, Variant::Null)) {
                        return Value::Null;
                    }
                }
                let idx = rng.gen_range(0..variants.len());
                let branch = &variants[idx];
                if matches!(branch, Variant::Null) {
                    Value::Null
                } else {
                    Value::Union(branch.type_name(), Box::new(branch.random(cxt, rng, depth + 1)))
                }
            }
            Variant::Named(n) => match cxt.get(n) {
                Some(inner) => inner.clone().random(cxt, rng, depth + 1),
                None => Value::Null,
            },
        }
    }
}
