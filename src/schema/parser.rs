use super::common::{Field, Name, Order};
use super::Variant;
use crate::error::AvroError;
use crate::error::AvroResult;
use crate::schema::common::validate_name;
use crate::value::{Record, Value};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};

const PRIMITIVE_NAMES: [&str; 8] = [
    "null", "boolean", "int", "long", "float", "double", "bytes", "string",
];

/// Configuration for [`crate::Schema::from_str_with_config`]: a default
/// namespace to parse the root schema under, and an optional hook invoked
/// with every [`Variant`] as it is parsed (useful for schema introspection
/// or collecting named types outside the registry).
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Namespace the root schema is parsed under, used the same way an
    /// enclosing record's namespace is threaded to its fields.
    pub namespace: Option<String>,
    /// Called with each parsed `Variant` node, innermost first.
    pub type_hook: Option<fn(&Variant)>,
}

// Wraps a { name -> schema } lookup table to aid parsing named references in complex schemas
// During parsing, the value for each key may get updated as a schema discovers
// more information about the schema during parsing.
#[derive(Debug, Clone)]
pub(crate) struct Registry {
    pub(crate) cxt: HashMap<String, Variant>,
    config: ParserConfig,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub(crate) fn with_config(config: ParserConfig) -> Self {
        Self {
            cxt: HashMap::new(),
            config,
        }
    }

    pub(crate) fn get<'a>(&'a self, name: &str) -> Option<&'a Variant> {
        self.cxt.get(name)
    }

    fn fire_hook(&self, variant: &Variant) {
        if let Some(hook) = self.config.type_hook {
            hook(variant);
        }
    }

    pub(crate) fn parse_schema(
        &mut self,
        value: &JsonValue,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<Variant> {
        let variant = match value {
            // Parse a complex schema
            JsonValue::Object(ref schema) => self.parse_object(schema, enclosing_namespace)?,
            // Parse a primitive schema, could also be a named schema reference
            JsonValue::String(ref schema) => self.parse_primitive(schema, enclosing_namespace)?,
            // Parse a union schema
            JsonValue::Array(ref schema) => self.parse_union(schema, enclosing_namespace)?,
            _ => return Err(AvroError::UnknownSchema),
        };
        self.fire_hook(&variant);
        Ok(variant)
    }

    fn parse_union(
        &mut self,
        schema: &[JsonValue],
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<Variant> {
        let mut union_schema = vec![];
        let mut seen_kinds: HashSet<String> = HashSet::new();
        for s in schema {
            let parsed_schema = self.parse_schema(s, enclosing_namespace)?;
            if let Variant::Union { .. } = parsed_schema {
                return Err(AvroError::NestedUnion);
            }
            let key = parsed_schema.branch_kind_key();
            if !seen_kinds.insert(key) {
                return Err(AvroError::DuplicateSchemaInUnion);
            }
            union_schema.push(parsed_schema);
        }
        Ok(Variant::Union {
            variants: union_schema,
        })
    }

    fn get_fullname(&self, name: &str, enclosing_namespace: Option<&str>) -> String {
        if let Some(namespace) = enclosing_namespace {
            format!("{}.{}", namespace, name)
        } else {
            name.to_string()
        }
    }

    /// Parse a `serde_json::Value` representing a primitive Avro type into a `Variant`.
    fn parse_primitive(
        &mut self,
        schema: &str,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<Variant> {
        match schema {
            "null" => Ok(Variant::Null),
            "boolean" => Ok(Variant::Boolean),
            "int" => Ok(Variant::Int),
            "long" => Ok(Variant::Long),
            "double" => Ok(Variant::Double),
            "float" => Ok(Variant::Float),
            "bytes" => Ok(Variant::Bytes),
            "string" => Ok(Variant::Str),
            other if !other.is_empty() => {
                let name = self.get_fullname(other, enclosing_namespace);
                if self.cxt.contains_key(&name) {
                    Ok(Variant::Named(name))
                } else if self.cxt.contains_key(other) {
                    Ok(Variant::Named(other.to_string()))
                } else {
                    Err(AvroError::NamedSchemaNotYetDefined(other.to_string()))
                }
            }
            _ => Err(AvroError::UnknownSchema),
        }
    }

    fn parse_record_fields(
        &mut self,
        fields: &[serde_json::Value],
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<IndexMap<String, Field>> {
        let mut fields_parsed = IndexMap::with_capacity(fields.len());
        for field_obj in fields {
            match field_obj {
                JsonValue::Object(o) => {
                    let name = o
                        .get("name")
                        .and_then(|a| a.as_str())
                        .ok_or(AvroError::RecordNameNotFound)?;

                    if fields_parsed.contains_key(name) {
                        return Err(AvroError::DuplicateField(name.to_string()));
                    }

                    let ty: &JsonValue = o.get("type").ok_or(AvroError::RecordTypeNotFound)?;
                    let mut ty = self.parse_schema(ty, enclosing_namespace)?;

                    // if ty is named use enclosing namespace to construct the fullname
                    if let Some(name) = ty.get_named_mut() {
                        if name.namespace().is_none() {
                            if let Some(namespace) = enclosing_namespace {
                                name.set_namespace(namespace)?;
                            }
                        }
                    }

                    let default = if let Some(v) = o.get("default") {
                        Some(parse_default(v, &ty)?)
                    } else {
                        None
                    };

                    let order = if let Some(order) = o.get("order") {
                        parse_field_order(order)?
                    } else {
                        Order::Ascending
                    };

                    let aliases = parse_aliases(o.get("aliases"), enclosing_namespace)?;
                    let doc = parse_doc(o.get("doc"));

                    fields_parsed.insert(
                        name.to_string(),
                        Field::new(name, ty, default, order, aliases, doc)?,
                    );
                }
                _ => return Err(AvroError::InvalidRecordFieldType),
            }
        }

        Ok(fields_parsed)
    }

    fn parse_object(
        &mut self,
        value: &Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<Variant> {
        match value.get("type") {
            Some(&JsonValue::String(ref s)) if s == "record" => {
                let rec_name = Name::from_json(value, enclosing_namespace)?;
                reject_primitive_name(&rec_name)?;

                // Insert a named reference to support recursive schema definitions.
                self.cxt
                    .insert(rec_name.to_string(), Variant::Named(rec_name.to_string()));

                let fields = if let Some(JsonValue::Array(ref fields_vec)) = value.get("fields") {
                    fields_vec
                } else {
                    return Err(AvroError::ExpectedFieldsJsonArray);
                };

                let record_namespace = if rec_name.namespace().is_some() {
                    rec_name.namespace()
                } else {
                    enclosing_namespace
                };

                let fields = self.parse_record_fields(fields, record_namespace)?;
                let aliases = parse_aliases(value.get("aliases"), record_namespace)?;

                let rec = Variant::Record {
                    name: rec_name.clone(),
                    aliases,
                    fields,
                };

                let rec_for_registry = rec.clone();
                let rec_name = rec_name.to_string();

                // if a record schema is being redefined throw an error.
                if let Some(Variant::Named(_)) = self.cxt.get(&rec_name) {
                    self.cxt.insert(rec_name, rec_for_registry);
                } else {
                    return Err(AvroError::DuplicateSchema(rec_name));
                }

                Ok(rec)
            }
            Some(&JsonValue::String(ref s)) if s == "enum" => {
                let name = Name::from_json(value, enclosing_namespace)?;
                reject_primitive_name(&name)?;
                let aliases = parse_aliases(value.get("aliases"), enclosing_namespace)?;
                let mut symbols = vec![];

                match value.get("symbols") {
                    Some(JsonValue::Array(sym)) => {
                        for v in sym {
                            let symbol = v.as_str().ok_or(AvroError::EnumSymbolParseErr)?;
                            validate_name(0, symbol)?;
                            symbols.push(symbol.to_string());
                        }
                    }
                    Some(_other) => return Err(AvroError::EnumSymbolParseErr),
                    None => return Err(AvroError::EnumSymbolsMissing),
                }

                let name_str = name.fullname();

                if self.cxt.contains_key(&name_str) {
                    return Err(AvroError::DuplicateSchema(name_str));
                }

                let enum_schema = Variant::Enum {
                    name,
                    aliases,
                    symbols,
                };

                self.cxt.insert(name_str, enum_schema.clone());

                Ok(enum_schema)
            }
            Some(&JsonValue::String(ref s)) if s == "array" => {
                let items_schema = value.get("items").ok_or(AvroError::ArrayItemsNotFound)?;
                let parsed_items = self.parse_schema(items_schema, enclosing_namespace)?;
                Ok(Variant::Array {
                    items: Box::new(parsed_items),
                })
            }
            Some(&JsonValue::String(ref s)) if s == "map" => {
                let values_schema = value.get("values").ok_or(AvroError::MapValuesNotFound)?;
                let parsed_values = self.parse_schema(values_schema, enclosing_namespace)?;
                Ok(Variant::Map {
                    values: Box::new(parsed_values),
                })
            }
            Some(&JsonValue::String(ref s)) if s == "fixed" => {
                let name = Name::from_json(value, enclosing_namespace)?;
                reject_primitive_name(&name)?;
                let size = value.get("size").ok_or(AvroError::FixedSizeNotFound)?;
                let name_str = name.fullname();

                if self.cxt.contains_key(&name_str) {
                    return Err(AvroError::DuplicateSchema(name_str));
                }

                let fixed_schema = Variant::Fixed {
                    name,
                    size: size.as_u64().ok_or(AvroError::FixedSizeNotNumber)? as usize,
                };

                self.cxt.insert(name_str, fixed_schema.clone());

                Ok(fixed_schema)
            }
            Some(JsonValue::String(ref s)) if s == "null" => Ok(Variant::Null),
            Some(JsonValue::String(ref s)) if s == "boolean" => Ok(Variant::Boolean),
            Some(JsonValue::String(ref s)) if s == "int" => Ok(Variant::Int),
            Some(JsonValue::String(ref s)) if s == "long" => Ok(Variant::Long),
            Some(JsonValue::String(ref s)) if s == "float" => Ok(Variant::Float),
            Some(JsonValue::String(ref s)) if s == "double" => Ok(Variant::Double),
            Some(JsonValue::String(ref s)) if s == "bytes" => Ok(Variant::Bytes),
            Some(JsonValue::String(ref s)) if s == "string" => Ok(Variant::Str),
            Some(JsonValue::String(other)) => Err(AvroError::SchemaParseFailed(other.clone())),
            _other => Err(AvroError::UnknownSchema),
        }
    }
}

fn reject_primitive_name(name: &Name) -> AvroResult<()> {
    if PRIMITIVE_NAMES.contains(&name.name.as_str()) {
        Err(AvroError::PrimitiveRedefinition(name.name.clone()))
    } else {
        Ok(())
    }
}

fn parse_doc(value: Option<&JsonValue>) -> Option<String> {
    if let Some(JsonValue::String(s)) = value {
        Some(s.to_string())
    } else {
        None
    }
}

// Parses the `order` of a field, defaults to `ascending` order
pub(crate) fn parse_field_order(order: &JsonValue) -> AvroResult<Order> {
    match *order {
        JsonValue::String(ref s) => s.parse(),
        _ => Err(AvroError::InvalidFieldOrdering),
    }
}

// Parses and namespace-qualifies the aliases of a named type or field.
fn parse_aliases(
    aliases: Option<&JsonValue>,
    enclosing_namespace: Option<&str>,
) -> AvroResult<Option<Vec<String>>> {
    match aliases {
        Some(JsonValue::Array(ref aliases)) => {
            let mut alias_parsed = Vec::with_capacity(aliases.len());
            for a in aliases {
                let a = a.as_str().ok_or(AvroError::NameParseFailed)?;
                alias_parsed.push(Name::qualify_alias(a, enclosing_namespace)?);
            }
            Ok(Some(alias_parsed))
        }
        Some(_other) => Err(AvroError::NameParseFailed),
        None => Ok(None),
    }
}

pub(crate) fn parse_default(default_value: &JsonValue, schema_variant: &Variant) -> AvroResult<Value> {
    match (default_value, schema_variant) {
        (d, Variant::Union { variants }) => {
            let first_variant = variants.first().ok_or(AvroError::FailedDefaultUnion)?;
            let inner = parse_default(d, first_variant)?;
            if matches!(first_variant, Variant::Null) {
                Ok(Value::Null)
            } else {
                Ok(Value::Union(first_variant.type_name(), Box::new(inner)))
            }
        }
        (JsonValue::Null, Variant::Null) => Ok(Value::Null),
        (JsonValue::Bool(v), Variant::Boolean) => Ok(Value::Boolean(*v)),
        (JsonValue::Number(n), Variant::Int) => {
            Ok(Value::Int(n.as_i64().ok_or(AvroError::DefaultValueParse)? as i32))
        }
        (JsonValue::Number(n), Variant::Long) => {
            Ok(Value::Long(n.as_i64().ok_or(AvroError::DefaultValueParse)?))
        }
        (JsonValue::Number(n), Variant::Float) => {
            Ok(Value::Float(n.as_f64().ok_or(AvroError::DefaultValueParse)? as f32))
        }
        (JsonValue::Number(n), Variant::Double) => {
            Ok(Value::Double(n.as_f64().ok_or(AvroError::DefaultValueParse)?))
        }
        (JsonValue::String(n), Variant::Bytes) => Ok(Value::Bytes(n.as_bytes().to_vec())),
        (JsonValue::String(n), Variant::Str) => Ok(Value::Str(n.clone())),
        (JsonValue::Object(v), Variant::Record { name, fields, .. }) => {
            let mut rec = Record::new(&name.fullname());

            for (fname, field) in fields {
                let value = if let Some(jv) = v.get(fname) {
                    parse_default(jv, &field.ty)?
                } else if let Some(d) = &field.default {
                    d.clone()
                } else {
                    return Err(AvroError::DefaultValueParse);
                };
                rec.fields.insert(fname.clone(), value);
            }

            Ok(Value::Record(rec))
        }
        (JsonValue::String(n), Variant::Enum { symbols, .. }) => {
            if symbols.contains(n) {
                Ok(Value::Enum(n.clone()))
            } else {
                Err(AvroError::UnknownEnumSymbol(n.clone()))
            }
        }
        (JsonValue::Array(arr), Variant::Array { items }) => {
            let mut default_arr_items: Vec<Value> = Vec::with_capacity(arr.len());
            for v in arr {
                default_arr_items.push(parse_default(v, items)?);
            }

            Ok(Value::Array(default_arr_items))
        }
        (
            JsonValue::Object(map),
            Variant::Map {
                values: values_schema,
            },
        ) => {
            let mut values = std::collections::HashMap::with_capacity(map.len());
            for (k, v) in map {
                let parsed_value = parse_default(v, values_schema)?;
                values.insert(k.to_string(), parsed_value);
            }

            Ok(Value::Map(values))
        }

        (JsonValue::String(n), Variant::Fixed { size, .. }) => {
            let bytes = n.as_bytes().to_vec();
            if bytes.len() != *size {
                return Err(AvroError::FixedValueLenMismatch {
                    found: bytes.len(),
                    expected: *size,
                });
            }
            Ok(Value::Fixed(bytes))
        }
        (_d, _s) => Err(AvroError::DefaultValueParse),
    }
}
