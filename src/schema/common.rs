// This module contains definition of types that are common across a subset of
// the schema implementation.

use crate::error::AvroError;
use crate::schema::Variant;
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::fmt::{self, Display};
use std::str::FromStr;

///////////////////////////////////////////////////////////////////////////////
/// Name implementation for named types: record, fixed, enum
///////////////////////////////////////////////////////////////////////////////

pub(crate) fn validate_name(idx: usize, name: &str) -> Result<(), AvroError> {
    if name.contains('.')
        || (name.starts_with(|a: char| a.is_ascii_digit()) && idx == 0)
        || name.is_empty()
        || !name.chars().any(|a| a.is_ascii_alphanumeric() || a == '_')
    {
        Err(AvroError::InvalidName)
    } else {
        Ok(())
    }
}

// Follows the grammar: <empty> | <name>[(<dot><name>)*]
pub(crate) fn validate_namespace(s: &str) -> Result<(), AvroError> {
    let split = s.split('.');
    for (i, n) in split.enumerate() {
        let _ = validate_name(i, n).map_err(|_| AvroError::InvalidNamespace)?;
    }
    Ok(())
}

/// Represents the `fullname` attribute of a named avro type: record, fixed
/// or enum.
#[derive(Debug, Clone, Eq, PartialOrd, Ord)]
pub struct Name {
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
}

impl Name {
    // Creates a new name with validation. This will extract the namespace if a dot is present in `name`.
    // Any further calls to set_namespace will be a noop if the name already contains a dot.
    pub(crate) fn new(name: &str) -> Result<Self, AvroError> {
        let mut namespace = None;
        let name = if name.contains('.') {
            let _ = validate_namespace(name)?;
            let idx = name.rfind('.').unwrap();
            namespace = Some(name[..idx].to_string());
            let name = &name[idx + 1..];
            validate_name(0, name)?;
            name
        } else {
            validate_name(0, name)?;
            name
        };

        Ok(Self {
            name: name.to_string(),
            namespace,
        })
    }

    pub(crate) fn from_json(
        json: &serde_json::map::Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
    ) -> Result<Self, AvroError> {
        let mut name = if let Some(JsonValue::String(ref s)) = json.get("name") {
            Name::new(s)
        } else {
            return Err(AvroError::NameParseFailed);
        }?;

        // As per spec: if the name field has a dot, that is a fullname and any
        // namespace field is ignored. Otherwise, a `namespace` field on the
        // JSON wins over the enclosing namespace.
        if name.namespace.is_none() {
            if let Some(namespace) = json.get("namespace") {
                if let JsonValue::String(s) = namespace {
                    validate_namespace(s)?;
                    name.set_namespace(s)?;
                }
            } else if let Some(a) = enclosing_namespace {
                validate_namespace(a)?;
                name.set_namespace(a)?;
            }
        }

        Ok(name)
    }

    /// Parses a name the same way `from_json` does, but namespace-qualifies
    /// a bare alias string instead of reading a `name`/`namespace` pair.
    pub(crate) fn qualify_alias(
        alias: &str,
        enclosing_namespace: Option<&str>,
    ) -> Result<String, AvroError> {
        let mut name = Name::new(alias)?;
        if name.namespace.is_none() {
            if let Some(ns) = enclosing_namespace {
                name.set_namespace(ns)?;
            }
        }
        Ok(name.fullname())
    }

    pub(crate) fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    // receives a mutable json and parses a Name, removing namespace. Used for canonicalization.
    pub(crate) fn from_json_mut(
        json: &mut serde_json::map::Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
    ) -> Result<Self, AvroError> {
        let mut name = if let Some(JsonValue::String(ref s)) = json.get("name") {
            Name::new(s)
        } else {
            return Err(AvroError::NameParseFailed);
        }?;

        if name.namespace.is_none() {
            if let Some(namespace) = json.get("namespace") {
                if let JsonValue::String(s) = namespace {
                    validate_namespace(s)?;
                    name.set_namespace(s)?;
                    json.remove("namespace");
                }
            } else if let Some(a) = enclosing_namespace {
                validate_namespace(a)?;
                name.set_namespace(a)?;
            }
        }

        Ok(name)
    }

    pub(crate) fn set_namespace(&mut self, namespace: &str) -> Result<(), AvroError> {
        // empty string is a null namespace
        if namespace.is_empty() {
            return Ok(());
        }

        validate_namespace(namespace)?;
        // If a namespace was already extracted when constructing name (name had a dot)
        // then this is a noop.
        if self.namespace.is_none() {
            self.namespace = Some(namespace.to_string());
        }
        Ok(())
    }

    pub(crate) fn fullname(&self) -> String {
        if let Some(n) = &self.namespace {
            if n.is_empty() {
                self.name.to_string()
            } else {
                format!("{}.{}", n, self.name)
            }
        } else {
            self.name.to_string()
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref namespace) = self.namespace {
            write!(f, "{}.{}", namespace, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl FromStr for Name {
    type Err = AvroError;

    fn from_str(s: &str) -> Result<Self, AvroError> {
        Name::new(s)
    }
}

impl std::convert::TryFrom<&str> for Name {
    type Error = AvroError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.fullname() == other.fullname()
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Ordering for record fields
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, PartialEq, Clone)]
pub enum Order {
    /// Sort in ascending order.
    Ascending,
    /// Sort in descending order.
    Descending,
    /// Field is ignored for sorting purposes.
    Ignore,
}

impl FromStr for Order {
    type Err = AvroError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(Order::Ascending),
            "descending" => Ok(Order::Descending),
            "ignore" => Ok(Order::Ignore),
            other => Err(AvroError::UnknownFieldOrdering(other.to_string())),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Record field definition.
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: Variant,
    pub(crate) default: Option<Value>,
    pub(crate) order: Order,
    pub(crate) aliases: Option<Vec<String>>,
    pub(crate) doc: Option<String>,
}

impl std::cmp::PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Field {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &str,
        ty: Variant,
        default: Option<Value>,
        order: Order,
        aliases: Option<Vec<String>>,
        doc: Option<String>,
    ) -> Result<Self, AvroError> {
        // field names also must adhere to a valid name.
        validate_name(0, name)?;
        Ok(Field {
            name: name.to_string(),
            ty,
            default,
            order,
            aliases,
            doc,
        })
    }
}
