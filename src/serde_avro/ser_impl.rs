use super::SerdeWriter;
use crate::error::AvroError;
use crate::value::Record;
use crate::Value;
use serde::Serialize;
use std::collections::HashMap;

pub struct MapSerializer {
    map: HashMap<String, Value>,
}

impl MapSerializer {
    pub fn new(len: Option<usize>) -> Self {
        let map = match len {
            Some(len) => HashMap::with_capacity(len),
            None => HashMap::new(),
        };

        MapSerializer { map }
    }
}

impl serde::ser::SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = AvroError;

    fn serialize_entry<K: ?Sized, V: ?Sized>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), Self::Error>
    where
        K: Serialize,
        V: Serialize,
    {
        let key = key.serialize(&mut SerdeWriter)?;
        if let Value::Str(s) = key {
            let value = value.serialize(&mut SerdeWriter)?;
            self.map.insert(s, value);
            Ok(())
        } else {
            Err(AvroError::ArgumentError(
                "avro map keys must serialize to a string".to_string(),
            ))
        }
    }

    fn serialize_key<T: ?Sized>(&mut self, _key: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

//////////////////////////////////////////////////////////////////////////////
/// Rust structs to avro record
//////////////////////////////////////////////////////////////////////////////
pub struct StructSerializer {
    name: String,
    fields: indexmap::IndexMap<String, Value>,
}

impl StructSerializer {
    pub fn new(name: &str, len: usize) -> StructSerializer {
        StructSerializer {
            name: name.to_string(),
            fields: indexmap::IndexMap::with_capacity(len),
        }
    }
}

impl serde::ser::SerializeStruct for StructSerializer {
    type Ok = Value;
    type Error = AvroError;

    fn serialize_field<T: ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.fields
            .insert(name.to_owned(), value.serialize(&mut SerdeWriter)?);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let record = Record {
            name: self.name,
            fields: self.fields,
        };
        Ok(Value::Record(record))
    }
}

//////////////////////////////////////////////////////////////////////////////
/// Sequences
//////////////////////////////////////////////////////////////////////////////

pub struct SeqSerializer {
    items: Vec<Value>,
}

impl SeqSerializer {
    pub fn new(len: Option<usize>) -> SeqSerializer {
        let items = match len {
            Some(len) => Vec::with_capacity(len),
            None => Vec::new(),
        };

        SeqSerializer { items }
    }
}

// `Vec<u8>`'s blanket `Serialize` impl serializes element-by-element through
// `serialize_u8`, not through `serialize_bytes`, so there is no reliable way
// to recover "this sequence was really an avro bytes/fixed value" here. A
// sequence of Rust bytes serializes to `Value::Array(Value::Int, ...)`;
// callers that want `Value::Bytes`/`Value::Fixed` should build those
// directly or serialize a `&[u8]` (which does route through
// `serialize_bytes`).
impl<'a> serde::ser::SerializeSeq for SeqSerializer {
    type Ok = Value;
    type Error = AvroError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        let v = value.serialize(&mut SerdeWriter)?;
        self.items.push(v);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Array(self.items))
    }
}

//////////////////////////////////////////////////////////////////////////////
/// Tuples
//////////////////////////////////////////////////////////////////////////////

impl<'a> serde::ser::SerializeTuple for SeqSerializer {
    type Ok = Value;
    type Error = AvroError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        let v = value.serialize(&mut SerdeWriter)?;
        self.items.push(v);
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Array(self.items))
    }
}
