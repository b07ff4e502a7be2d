#![allow(missing_docs)]

use serde::{de, ser};
use std::fmt::Display;

// Required impls for Serde
impl ser::Error for AvroError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

impl de::Error for AvroError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

pub type AvroResult<T> = Result<T, AvroError>;

/// Errors raised by the schema parser, codec, resolver and value layer.
/// Variants are grouped into the five categories of the design: schema
/// errors, validation errors, decode errors, resolve errors and argument
/// errors, plus a small band of serde-bridge errors.
#[derive(thiserror::Error, Debug)]
pub enum AvroError {
    // --- Schema errors: malformed or ill-formed schema JSON ---
    #[error("failed to parse schema JSON")]
    SchemaJson(#[source] serde_json::Error),
    #[error("failed to read schema file")]
    SchemaIo(#[source] std::io::Error),
    #[error("expected avro schema to be a JSON string, object or array")]
    UnknownSchema,
    #[error("unknown type `{0}` in schema")]
    SchemaParseFailed(String),
    #[error("named schema `{0}` must be defined before use")]
    NamedSchemaNotYetDefined(String),
    #[error("`{0}` is a primitive type name and cannot be redefined")]
    PrimitiveRedefinition(String),
    #[error("duplicate definition of named schema `{0}`")]
    DuplicateSchema(String),
    #[error("duplicate field name `{0}` in record schema")]
    DuplicateField(String),
    #[error("record schema is missing a required `name` field")]
    RecordNameNotFound,
    #[error("record schema is missing a required `type` field for a field")]
    RecordTypeNotFound,
    #[error("record `fields` must be a JSON array")]
    ExpectedFieldsJsonArray,
    #[error("a record field entry must be a JSON object")]
    InvalidRecordFieldType,
    #[error("enum schema is missing a required `symbols` field")]
    EnumSymbolsMissing,
    #[error("enum symbol must be a string")]
    EnumSymbolParseErr,
    #[error("fixed schema is missing a required `size` field")]
    FixedSizeNotFound,
    #[error("fixed schema `size` must be a non-negative integer")]
    FixedSizeNotNumber,
    #[error("array schema is missing a required `items` field")]
    ArrayItemsNotFound,
    #[error("map schema is missing a required `values` field")]
    MapValuesNotFound,
    #[error("unions may not directly nest another union")]
    NestedUnion,
    #[error("unions may not contain two schemas of the same kind")]
    DuplicateSchemaInUnion,
    #[error("could not parse a name from the schema JSON")]
    NameParseFailed,
    #[error("namespaces must follow the grammar <name>[(<dot><name>)*]")]
    InvalidNamespace,
    #[error("names must start with [A-Za-z_] and contain only [A-Za-z0-9_]")]
    InvalidName,
    #[error("unknown field ordering `{0}`")]
    UnknownFieldOrdering(String),
    #[error("field `order` must be a string")]
    InvalidFieldOrdering,
    #[error("default value does not match its field's declared type")]
    DefaultValueParse,
    #[error("default value for a union must match the union's first branch")]
    FailedDefaultUnion,

    // --- Validation errors: a value does not conform to a schema ---
    #[error("value does not match schema")]
    SchemaDataMismatch,
    #[error("fixed value length mismatch: found {found}, expected {expected}")]
    FixedValueLenMismatch { found: usize, expected: usize },
    #[error("record is missing required field `{0}`")]
    RecordFieldMissing(String),
    #[error("record has unexpected field `{0}`")]
    UnexpectedRecordField(String),
    #[error("enum symbol `{0}` is not declared by the schema")]
    UnknownEnumSymbol(String),
    #[error("no branch of the union matches the value")]
    NotFoundInUnion,
    #[error("named schema `{0}` is not present in the schema registry")]
    NamedSchemaNotFound(String),

    // --- Decode errors: malformed or truncated wire data ---
    #[error("unexpected end of buffer while decoding")]
    Truncated,
    #[error("boolean byte must be 0 or 1, found {0}")]
    InvalidBooleanByte(u8),
    #[error("bytes/string length prefix was negative")]
    NegativeLength,
    #[error("decoded string was not valid UTF-8")]
    InvalidUtf8,
    #[error("enum ordinal {0} is out of range")]
    EnumOrdinalOutOfRange(usize),
    #[error("block count's negated size prefix was invalid")]
    InvalidBlockSize,

    // --- Resolve errors: a writer/reader schema pair cannot be compiled ---
    #[error("writer type {0} cannot be resolved against reader type {1}")]
    Incompatible(String, String),
    #[error(
        "writer record `{0}` has no corresponding field in reader record `{1}` and no default"
    )]
    MissingReaderField(String, String),
    #[error("reader field `{0}` matches more than one writer field")]
    AmbiguousFieldAlias(String),
    #[error("no compatible branch found in reader union for writer type {0}")]
    NoCompatibleUnionBranch(String),
    #[error("writer fixed `{0}` is not name-compatible with reader fixed `{1}`")]
    FixedNameMismatch(String, String),
    #[error("writer fixed size {0} does not match reader fixed size {1}")]
    FixedSizeMismatch(usize, usize),
    #[error("writer enum `{0}` is not name-compatible with reader enum `{1}`")]
    EnumNameMismatch(String, String),
    #[error("writer record `{0}` is not name-compatible with reader record `{1}`")]
    RecordNameMismatch(String, String),

    // --- Argument errors: caller misuse of the public API ---
    #[error("{0}")]
    ArgumentError(String),
    #[error("expected a JSON object for a record value")]
    ExpectedJsonObject,
    #[error("unions must be encoded as a single-key {{branch: value}} mapping, or bare null")]
    ExpectedUnionMapping,
    #[error("unknown union branch `{0}`")]
    UnknownUnionBranch(String),

    // --- Serde bridge ---
    #[error("serde error: {0}")]
    Message(String),
    #[error("unsupported Rust type for avro conversion")]
    Unsupported,
    #[error("expected a value matching variant `{0}`")]
    ExpectedVariantNotFound(&'static str),
}
