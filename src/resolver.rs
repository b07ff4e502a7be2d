//! Compiles a writer/reader schema pair into a reusable decoder.
//!
//! Unlike [`crate::Schema::from_buffer`], which only ever decodes data back
//! into its own shape, a [`Resolver`] decodes data written with one schema
//! into the shape of a different, compatible schema: fields get renamed via
//! aliases, numeric types get promoted, symbols get remapped, and so on. The
//! compatibility check runs once, during [`Resolver::compile`]; decoding
//! with the result never re-inspects either schema, except for the one
//! genuinely data-dependent case the Avro spec allows: an enum symbol the
//! writer wrote that the reader doesn't know may only fail once we see which
//! symbol ordinal actually landed on the wire.
//!
//! Resolution is compiled into a [`ResolvedNode`] tree. Record types can
//! reference themselves directly or through a cycle of other records (the
//! classic linked-list schema), so compiling a record's fields eagerly would
//! recurse forever. Named pairs are memoized in a `(writer fullname, reader
//! fullname) -> slot` cache; a record's own compilation reserves its slot
//! before walking its fields, so a self-reference resolves to a
//! [`ResolvedNode::Ref`] pointing at a slot that gets filled in once the
//! enclosing record finishes compiling.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::{AvroError, AvroResult};
use crate::schema::{Registry, Schema, Variant};
use crate::tap::Tap;
use crate::value::{Record, Value};

type Slot = Rc<RefCell<Option<ResolvedNode>>>;

/// A compiled writer-to-reader resolution, produced by [`Schema::create_resolver`].
pub struct Resolver {
    root: ResolvedNode,
    wcxt: Registry,
}

impl Resolver {
    /// Compiles a resolver that decodes bytes written with `writer` into
    /// `reader`'s shape. All structural compatibility is checked here; only
    /// an enum symbol unknown to the reader can still fail during `decode`.
    pub fn compile(writer: &Schema, reader: &Schema) -> AvroResult<Resolver> {
        let mut cache: HashMap<(String, String), Slot> = HashMap::new();
        let root = compile_variant(writer.variant(), reader.variant(), &writer.cxt, &reader.cxt, &mut cache)?;
        Ok(Resolver {
            root,
            wcxt: writer.cxt.clone(),
        })
    }

    /// Decodes `bytes` (written with the resolver's writer schema) into a
    /// value shaped like the resolver's reader schema.
    ///
    /// If `allow_trailing` is `false`, every byte of `bytes` must be
    /// consumed; leftover bytes fail with [`AvroError::Truncated`]. If
    /// `allow_trailing` is `true`, bytes past the decoded value are
    /// ignored.
    pub fn decode(&self, bytes: &[u8], allow_trailing: bool) -> AvroResult<Value> {
        let mut tap = Tap::for_reading(bytes);
        let value = self.root.decode(&mut tap, &self.wcxt)?;
        if !tap.is_valid() {
            return Err(AvroError::Truncated);
        }
        if !allow_trailing && !tap.at_end() {
            return Err(AvroError::Truncated);
        }
        Ok(value)
    }
}

#[derive(Clone)]
enum ResolvedNode {
    Null,
    Boolean,
    Int,
    IntToLong,
    IntToFloat,
    IntToDouble,
    Long,
    LongToFloat,
    LongToDouble,
    Float,
    FloatToDouble,
    Double,
    Bytes,
    BytesToString,
    Str,
    StringToBytes,
    Fixed(usize),
    Enum {
        writer_symbols: Vec<String>,
        mapping: Vec<Option<usize>>,
        reader_symbols: Vec<String>,
    },
    Array(Box<ResolvedNode>),
    Map(Box<ResolvedNode>),
    Record {
        reader_name: String,
        plan: Vec<FieldPlan>,
        missing_defaults: Vec<(String, Value)>,
    },
    /// Writer wrote a union; `branches` is resolved per writer branch index.
    WriterUnion(Vec<ResolvedNode>),
    /// Writer wrote a plain value but the reader expects a union; `reader_tag`
    /// is the matching branch's canonical type name (bare `Value::Null` if it
    /// is the null branch, per this crate's untagged-null convention).
    NonUnionToReaderUnion {
        reader_tag: String,
        node: Box<ResolvedNode>,
    },
    /// Indirection used to break cycles through self- or mutually-referential
    /// named types. Always fully populated by the time `decode` runs.
    Ref(Slot),
}

#[derive(Clone)]
enum FieldPlan {
    Match { reader_name: String, node: Box<ResolvedNode> },
    Skip { writer_variant: Variant },
}

impl ResolvedNode {
    fn decode(&self, tap: &mut Tap, wcxt: &Registry) -> AvroResult<Value> {
        match self {
            ResolvedNode::Null => Ok(Value::Null),
            ResolvedNode::Boolean => match tap.read_boolean() {
                0 => Ok(Value::Boolean(false)),
                1 => Ok(Value::Boolean(true)),
                other => Err(AvroError::InvalidBooleanByte(other)),
            },
            ResolvedNode::Int => Ok(Value::Int(tap.read_int())),
            ResolvedNode::IntToLong => Ok(Value::Long(i64::from(tap.read_int()))),
            ResolvedNode::IntToFloat => Ok(Value::Float(tap.read_int() as f32)),
            ResolvedNode::IntToDouble => Ok(Value::Double(f64::from(tap.read_int()))),
            ResolvedNode::Long => Ok(Value::Long(tap.read_long())),
            ResolvedNode::LongToFloat => Ok(Value::Float(tap.read_long() as f32)),
            ResolvedNode::LongToDouble => Ok(Value::Double(tap.read_long() as f64)),
            ResolvedNode::Float => Ok(Value::Float(tap.read_float())),
            ResolvedNode::FloatToDouble => Ok(Value::Double(f64::from(tap.read_float()))),
            ResolvedNode::Double => Ok(Value::Double(tap.read_double())),
            ResolvedNode::Bytes => tap.read_bytes().map(Value::Bytes).ok_or(AvroError::Truncated),
            ResolvedNode::BytesToString => {
                let bytes = tap.read_bytes().ok_or(AvroError::Truncated)?;
                String::from_utf8(bytes).map(Value::Str).map_err(|_| AvroError::InvalidUtf8)
            }
            ResolvedNode::Str => tap.read_string().map(Value::Str).ok_or(AvroError::InvalidUtf8),
            ResolvedNode::StringToBytes => tap.read_bytes().map(Value::Bytes).ok_or(AvroError::Truncated),
            ResolvedNode::Fixed(size) => Ok(Value::Fixed(tap.read_fixed(*size))),
            ResolvedNode::Enum {
                writer_symbols,
                mapping,
                reader_symbols,
            } => {
                let idx = tap.read_int();
                if idx < 0 {
                    return Err(AvroError::EnumOrdinalOutOfRange(idx as usize));
                }
                let widx = idx as usize;
                let wsym = writer_symbols
                    .get(widx)
                    .ok_or(AvroError::EnumOrdinalOutOfRange(widx))?;
                match mapping.get(widx).copied().flatten() {
                    Some(ridx) => Ok(Value::Enum(reader_symbols[ridx].clone())),
                    None => Err(AvroError::UnknownEnumSymbol(wsym.clone())),
                }
            }
            ResolvedNode::Array(item) => {
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
                        out.push(item.decode(tap, wcxt)?);
                    }
                }
                Ok(Value::Array(out))
            }
            ResolvedNode::Map(values) => {
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
                        let v = values.decode(tap, wcxt)?;
                        out.insert(k, v);
                    }
                }
                Ok(Value::Map(out))
            }
            ResolvedNode::Record {
                reader_name,
                plan,
                missing_defaults,
            } => {
                let mut rec = Record::new(reader_name);
                for field in plan {
                    match field {
                        FieldPlan::Match { reader_name, node } => {
                            let v = node.decode(tap, wcxt)?;
                            rec.fields.insert(reader_name.clone(), v);
                        }
                        FieldPlan::Skip { writer_variant } => {
                            writer_variant.skip(wcxt, tap)?;
                        }
                    }
                }
                for (name, default) in missing_defaults {
                    rec.fields.insert(name.clone(), default.clone());
                }
                Ok(Value::Record(rec))
            }
            ResolvedNode::WriterUnion(branches) => {
                let idx = tap.read_int();
                if idx < 0 {
                    return Err(AvroError::EnumOrdinalOutOfRange(idx as usize));
                }
                let branch = branches
                    .get(idx as usize)
                    .ok_or(AvroError::EnumOrdinalOutOfRange(idx as usize))?;
                branch.decode(tap, wcxt)
            }
            ResolvedNode::NonUnionToReaderUnion { reader_tag, node } => {
                let v = node.decode(tap, wcxt)?;
                if reader_tag == "null" {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Union(reader_tag.clone(), Box::new(v)))
                }
            }
            ResolvedNode::Ref(slot) => {
                let guard = slot.borrow();
                let node = guard
                    .as_ref()
                    .expect("resolver graph is fully compiled before decode runs");
                node.decode(tap, wcxt)
            }
        }
    }
}

fn resolve_named<'a>(v: &'a Variant, cxt: &'a Registry) -> AvroResult<&'a Variant> {
    match v {
        Variant::Named(n) => cxt.get(n).ok_or_else(|| AvroError::NamedSchemaNotFound(n.clone())),
        other => Ok(other),
    }
}

fn names_compatible(writer_fullname: &str, reader_fullname: &str, reader_aliases: &Option<Vec<String>>) -> bool {
    writer_fullname == reader_fullname
        || reader_aliases
            .as_ref()
            .map_or(false, |aliases| aliases.iter().any(|a| a == writer_fullname))
}

fn compile_variant(
    writer: &Variant,
    reader: &Variant,
    wcxt: &Registry,
    rcxt: &Registry,
    cache: &mut HashMap<(String, String), Slot>,
) -> AvroResult<ResolvedNode> {
    let writer = resolve_named(writer, wcxt)?;
    let reader = resolve_named(reader, rcxt)?;

    if let Variant::Union { variants: wvariants } = writer {
        let mut branches = Vec::with_capacity(wvariants.len());
        for wb in wvariants {
            branches.push(compile_variant(wb, reader, wcxt, rcxt, cache)?);
        }
        return Ok(ResolvedNode::WriterUnion(branches));
    }

    if let Variant::Union { variants: rvariants } = reader {
        for rb in rvariants {
            if let Ok(node) = compile_variant(writer, rb, wcxt, rcxt, cache) {
                return Ok(ResolvedNode::NonUnionToReaderUnion {
                    reader_tag: rb.type_name(),
                    node: Box::new(node),
                });
            }
        }
        return Err(AvroError::NoCompatibleUnionBranch(writer.type_name()));
    }

    match (writer, reader) {
        (Variant::Null, Variant::Null) => Ok(ResolvedNode::Null),
        (Variant::Boolean, Variant::Boolean) => Ok(ResolvedNode::Boolean),
        (Variant::Int, Variant::Int) => Ok(ResolvedNode::Int),
        (Variant::Int, Variant::Long) => Ok(ResolvedNode::IntToLong),
        (Variant::Int, Variant::Float) => Ok(ResolvedNode::IntToFloat),
        (Variant::Int, Variant::Double) => Ok(ResolvedNode::IntToDouble),
        (Variant::Long, Variant::Long) => Ok(ResolvedNode::Long),
        (Variant::Long, Variant::Float) => Ok(ResolvedNode::LongToFloat),
        (Variant::Long, Variant::Double) => Ok(ResolvedNode::LongToDouble),
        (Variant::Float, Variant::Float) => Ok(ResolvedNode::Float),
        (Variant::Float, Variant::Double) => Ok(ResolvedNode::FloatToDouble),
        (Variant::Double, Variant::Double) => Ok(ResolvedNode::Double),
        (Variant::Bytes, Variant::Bytes) => Ok(ResolvedNode::Bytes),
        (Variant::Bytes, Variant::Str) => Ok(ResolvedNode::BytesToString),
        (Variant::Str, Variant::Str) => Ok(ResolvedNode::Str),
        (Variant::Str, Variant::Bytes) => Ok(ResolvedNode::StringToBytes),
        (Variant::Fixed { name: wn, size: ws }, Variant::Fixed { name: rn, size: rs }) => {
            if wn.fullname() != rn.fullname() {
                return Err(AvroError::FixedNameMismatch(wn.fullname(), rn.fullname()));
            }
            if ws != rs {
                return Err(AvroError::FixedSizeMismatch(*ws, *rs));
            }
            Ok(ResolvedNode::Fixed(*rs))
        }
        (
            Variant::Enum {
                name: wn,
                symbols: wsyms,
                ..
            },
            Variant::Enum {
                name: rn,
                symbols: rsyms,
                aliases: raliases,
                ..
            },
        ) => {
            if !names_compatible(&wn.fullname(), &rn.fullname(), raliases) {
                return Err(AvroError::EnumNameMismatch(wn.fullname(), rn.fullname()));
            }
            let mapping = wsyms.iter().map(|s| rsyms.iter().position(|r| r == s)).collect();
            Ok(ResolvedNode::Enum {
                writer_symbols: wsyms.clone(),
                mapping,
                reader_symbols: rsyms.clone(),
            })
        }
        (Variant::Array { items: witems }, Variant::Array { items: ritems }) => Ok(ResolvedNode::Array(Box::new(
            compile_variant(witems, ritems, wcxt, rcxt, cache)?,
        ))),
        (Variant::Map { values: wvalues }, Variant::Map { values: rvalues }) => Ok(ResolvedNode::Map(Box::new(
            compile_variant(wvalues, rvalues, wcxt, rcxt, cache)?,
        ))),
        (
            Variant::Record {
                name: wn,
                fields: wfields,
                ..
            },
            Variant::Record {
                name: rn,
                fields: rfields,
                aliases: raliases,
                ..
            },
        ) => compile_record(wn.fullname(), wfields, rn.fullname(), rfields, raliases, wcxt, rcxt, cache),
        (w, r) => Err(AvroError::Incompatible(w.type_name(), r.type_name())),
    }
}

#[allow(clippy::too_many_arguments)]
fn compile_record(
    wfull: String,
    wfields: &indexmap::IndexMap<String, crate::schema::common::Field>,
    rfull: String,
    rfields: &indexmap::IndexMap<String, crate::schema::common::Field>,
    raliases: &Option<Vec<String>>,
    wcxt: &Registry,
    rcxt: &Registry,
    cache: &mut HashMap<(String, String), Slot>,
) -> AvroResult<ResolvedNode> {
    if !names_compatible(&wfull, &rfull, raliases) {
        return Err(AvroError::RecordNameMismatch(wfull, rfull));
    }

    let key = (wfull, rfull.clone());
    if let Some(slot) = cache.get(&key) {
        return Ok(ResolvedNode::Ref(slot.clone()));
    }
    let slot: Slot = Rc::new(RefCell::new(None));
    cache.insert(key, slot.clone());

    let mut plan = Vec::with_capacity(wfields.len());
    let mut matched_reader_fields: HashSet<String> = HashSet::new();

    for (wfname, wfield) in wfields {
        let mut found: Option<String> = None;
        for (rfname, rfield) in rfields {
            let name_hit =
                rfname == wfname || rfield.aliases.as_ref().map_or(false, |a| a.iter().any(|x| x == wfname));
            if name_hit {
                if found.is_some() {
                    return Err(AvroError::AmbiguousFieldAlias(wfname.clone()));
                }
                found = Some(rfname.clone());
            }
        }
        match found {
            Some(rfname) => {
                let rfield = rfields.get(&rfname).expect("matched field name must exist");
                let node = compile_variant(&wfield.ty, &rfield.ty, wcxt, rcxt, cache)?;
                matched_reader_fields.insert(rfname.clone());
                plan.push(FieldPlan::Match {
                    reader_name: rfname,
                    node: Box::new(node),
                });
            }
            None => {
                plan.push(FieldPlan::Skip {
                    writer_variant: wfield.ty.clone(),
                });
            }
        }
    }

    let mut missing_defaults = Vec::new();
    for (rfname, rfield) in rfields {
        if !matched_reader_fields.contains(rfname) {
            match &rfield.default {
                Some(d) => missing_defaults.push((rfname.clone(), d.clone())),
                None => return Err(AvroError::MissingReaderField(rfname.clone(), rfull)),
            }
        }
    }

    *slot.borrow_mut() = Some(ResolvedNode::Record {
        reader_name: rfull,
        plan,
        missing_defaults,
    });
    Ok(ResolvedNode::Ref(slot))
}
