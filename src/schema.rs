use std::collections::BTreeMap;

use crate::descriptor::{Descriptor, SchemaMap, TypeTag};
use crate::error::{Error, Result};
use crate::kind::{self, Kind};
use crate::primitive::{CharWidth, NumberWidth};
use crate::value::Value;
use crate::{decode, encode, validator, MAX_DEPTH, MAX_FIELDS};

/// A compiled schema, ready for repeated encode/decode calls.
///
/// Compilation happens once per raw schema: field names are sorted (binary collation) and
/// that order becomes the key-index assignment, each field's descriptor is resolved to a
/// bound codec, nested schemas are compiled all the way down, and the field-count and depth
/// limits are enforced. The compiled form is immutable, and safe to share across threads.
///
/// ```
/// # use keypack::{keypack, Schema, SchemaMap, TypeTag};
/// let mut raw = SchemaMap::new();
/// raw.insert("id".into(), TypeTag::Number.into());
/// raw.insert("name".into(), TypeTag::String.into());
/// let schema = Schema::new(&raw).unwrap();
///
/// let encoded = schema.encode(&keypack!({ "id": 4, "name": "ada" })).unwrap();
/// assert_eq!(schema.decode(&encoded).unwrap()["name"].as_str(), Some("ada"));
/// ```
#[derive(Clone, Debug)]
pub struct Schema {
    fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    pub(crate) name: String,
    pub(crate) codec: FieldCodec,
    pub(crate) size: Option<usize>,
}

/// A field's bound codec. Child schemas are compiled in, so encode/decode recursion never
/// re-resolves anything.
#[derive(Clone, Debug)]
pub(crate) enum FieldCodec {
    Boolean,
    Number(NumberWidth),
    String(CharWidth),
    Binary,
    Array(ElemCodec),
    Schema(Schema),
    SchemaArray(Schema),
}

/// Element codec for the primitive-array kinds.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ElemCodec {
    Boolean,
    Number(NumberWidth),
    String(CharWidth),
}

impl FieldCodec {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            FieldCodec::Boolean => Kind::Boolean,
            FieldCodec::Number(_) => Kind::Number,
            FieldCodec::String(_) => Kind::String,
            FieldCodec::Binary => Kind::Binary,
            FieldCodec::Array(ElemCodec::Boolean) => Kind::BooleanArray,
            FieldCodec::Array(ElemCodec::Number(_)) => Kind::NumberArray,
            FieldCodec::Array(ElemCodec::String(_)) => Kind::StringArray,
            FieldCodec::Schema(_) => Kind::Schema,
            FieldCodec::SchemaArray(_) => Kind::SchemaArray,
        }
    }
}

impl Schema {
    /// Compile a raw schema.
    pub fn new(raw: &SchemaMap) -> Result<Schema> {
        Schema::compile(raw, 0)
    }

    fn compile(raw: &SchemaMap, depth: usize) -> Result<Schema> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidSchema(format!(
                "schemas nested deeper than {} levels",
                MAX_DEPTH
            )));
        }
        if raw.len() > MAX_FIELDS {
            return Err(Error::InvalidSchema(format!(
                "{} fields, but key indices only span {}",
                raw.len(),
                MAX_FIELDS
            )));
        }
        let mut fields = Vec::with_capacity(raw.len());
        // BTreeMap iteration is already the canonical sorted order, so position here is the
        // key index.
        for (name, desc) in raw {
            let codec = Schema::bind(name, desc, depth)?;
            let size = desc.size();
            if size.is_some() && !matches!(codec, FieldCodec::String(_) | FieldCodec::Binary) {
                return Err(Error::InvalidSchema(format!(
                    "field [{}]: size is only valid on string and buffer fields",
                    name
                )));
            }
            fields.push(Field {
                name: name.clone(),
                codec,
                size,
            });
        }
        Ok(Schema { fields })
    }

    fn bind(name: &str, desc: &Descriptor, depth: usize) -> Result<FieldCodec> {
        let resolved = kind::resolve(desc)?;
        if matches!(
            resolved,
            Kind::BooleanArray | Kind::NumberArray | Kind::StringArray | Kind::SchemaArray
        ) && desc.items().map_or(false, |i| i.size().is_some())
        {
            return Err(Error::InvalidSchema(format!(
                "field [{}]: size is not supported on array items",
                name
            )));
        }
        Ok(match resolved {
            Kind::Boolean => FieldCodec::Boolean,
            Kind::Number => FieldCodec::Number(number_width(desc.tag())),
            Kind::String => FieldCodec::String(char_width(desc.tag())),
            Kind::Binary => FieldCodec::Binary,
            Kind::BooleanArray => FieldCodec::Array(ElemCodec::Boolean),
            Kind::NumberArray => {
                FieldCodec::Array(ElemCodec::Number(number_width(desc.items().unwrap().tag())))
            }
            Kind::StringArray => {
                FieldCodec::Array(ElemCodec::String(char_width(desc.items().unwrap().tag())))
            }
            Kind::Schema => {
                FieldCodec::Schema(Schema::compile(desc.schema().unwrap(), depth + 1)?)
            }
            Kind::SchemaArray => {
                let child = desc.items().unwrap().schema().unwrap();
                FieldCodec::SchemaArray(Schema::compile(child, depth + 1)?)
            }
        })
    }

    /// Number of fields, which is also one past the largest key index.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in key-index order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// The resolved kind of a field, if it exists.
    pub fn field_kind(&self, name: &str) -> Option<Kind> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.codec.kind())
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Encode a value object against this schema. Fields that are absent or `Null` are
    /// omitted from the buffer; fields not named by the schema are ignored. The value is not
    /// mutated, and every call returns a freshly allocated buffer.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        encode::encode(self, value)
    }

    /// Decode a buffer produced by [`encode`](Self::encode) with this same schema.
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        decode::decode(self, data)
    }

    /// Advisory type check: one human-readable warning per present field whose runtime type
    /// doesn't match its declared kind. Empty means the value would encode without
    /// mismatches.
    pub fn validate(&self, value: &Value) -> Vec<String> {
        validator::validate(self, value)
    }

    /// Best-effort conversion of each present field to its declared kind, so that a
    /// mismatched value can still be encoded. The conversions are lossy.
    pub fn coerce(&self, value: &Value) -> Value {
        validator::coerce(self, value)
    }

    /// Per-field encoded payload sizes in bytes (framing overhead excluded), for insight or
    /// troubleshooting.
    pub fn sizes(&self, value: &Value) -> Result<BTreeMap<String, usize>> {
        encode::sizes(self, value)
    }
}

fn number_width(tag: TypeTag) -> NumberWidth {
    match tag {
        TypeTag::Int8 => NumberWidth::Int8,
        TypeTag::Int16 => NumberWidth::Int16,
        TypeTag::Int32 => NumberWidth::Int32,
        TypeTag::Double => NumberWidth::Double,
        _ => NumberWidth::Minimal,
    }
}

fn char_width(tag: TypeTag) -> CharWidth {
    match tag {
        TypeTag::Char8 => CharWidth::One,
        TypeTag::Char32 => CharWidth::Four,
        _ => CharWidth::Two,
    }
}
