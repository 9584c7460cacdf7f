//! Resolution from declared type descriptors to the closed set of wire kinds.

use crate::descriptor::{Descriptor, TypeTag};
use crate::error::{Error, Result};

/// The resolved kind of a schema field. Every descriptor maps to exactly one of these; the
/// kind alone determines a field's wire shape (size-indicator width and payload layout).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Number,
    String,
    BooleanArray,
    NumberArray,
    StringArray,
    Schema,
    SchemaArray,
    Binary,
}

impl Kind {
    /// Lowercase name, for error and warning messages.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::BooleanArray => "boolean array",
            Kind::NumberArray => "number array",
            Kind::StringArray => "string array",
            Kind::Schema => "object",
            Kind::SchemaArray => "object array",
            Kind::Binary => "buffer",
        }
    }

    /// Whether payloads of this kind carry a 2-byte length prefix on the wire. The scalar
    /// kinds instead use a single count byte, from which the decoder also infers the numeric
    /// width.
    pub fn length_prefixed(&self) -> bool {
        !matches!(self, Kind::Boolean | Kind::Number)
    }
}

/// Resolve a descriptor to its kind.
///
/// An `object`/`json` tag is position-sensitive: with `items` it declares an array of those
/// items, with `schema` a single nested object. Both at once, or neither, is an error, as is
/// an `array` tag without `items`.
pub fn resolve(desc: &Descriptor) -> Result<Kind> {
    match desc.tag() {
        TypeTag::Boolean => Ok(Kind::Boolean),
        TypeTag::Number | TypeTag::Int8 | TypeTag::Int16 | TypeTag::Int32 | TypeTag::Double => {
            Ok(Kind::Number)
        }
        TypeTag::String | TypeTag::Char8 | TypeTag::Char16 | TypeTag::Char32 => Ok(Kind::String),
        TypeTag::Buffer => Ok(Kind::Binary),
        TypeTag::Array => {
            if desc.schema().is_some() {
                return Err(Error::InvalidSchema(
                    "array descriptor cannot carry a schema; use items".to_string(),
                ));
            }
            let items = desc.items().ok_or_else(|| {
                Error::InvalidSchema("array descriptor requires items".to_string())
            })?;
            array_of(items)
        }
        TypeTag::Object | TypeTag::Json => match (desc.items(), desc.schema()) {
            (Some(_), Some(_)) => Err(Error::InvalidSchema(
                "object descriptor cannot carry both items and schema".to_string(),
            )),
            (Some(items), None) => array_of(items),
            (None, Some(_)) => Ok(Kind::Schema),
            (None, None) => Err(Error::InvalidSchema(
                "object descriptor requires a schema or items".to_string(),
            )),
        },
    }
}

fn array_of(items: &Descriptor) -> Result<Kind> {
    match resolve(items)? {
        Kind::Boolean => Ok(Kind::BooleanArray),
        Kind::Number => Ok(Kind::NumberArray),
        Kind::String => Ok(Kind::StringArray),
        Kind::Schema => Ok(Kind::SchemaArray),
        kind => Err(Error::InvalidSchema(format!(
            "array items cannot be a {}",
            kind.name()
        ))),
    }
}
