use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A raw, uncompiled schema: an ordered mapping from field name to type descriptor.
pub type SchemaMap = BTreeMap<String, Descriptor>;

/// The closed set of type names a descriptor may carry.
///
/// `number` picks the smallest of 1/2/4-byte integer or 8-byte double per value; the
/// `int8`/`int16`/`int32`/`double` tags pin a field to one width instead. `string` writes two
/// bytes per code point; `char8` and `char32` select the narrow and wide unit widths.
/// `json` is an alias of `object`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Boolean,
    Number,
    Int8,
    Int16,
    Int32,
    Double,
    String,
    Char8,
    Char16,
    Char32,
    Buffer,
    Array,
    Object,
    Json,
}

impl TypeTag {
    /// Look a tag up by its schema-declaration name.
    pub fn from_name(name: &str) -> Result<TypeTag> {
        Ok(match name {
            "boolean" => TypeTag::Boolean,
            "number" => TypeTag::Number,
            "int8" => TypeTag::Int8,
            "int16" => TypeTag::Int16,
            "int32" => TypeTag::Int32,
            "double" => TypeTag::Double,
            "string" => TypeTag::String,
            "char8" => TypeTag::Char8,
            "char16" => TypeTag::Char16,
            "char32" => TypeTag::Char32,
            "buffer" => TypeTag::Buffer,
            "array" => TypeTag::Array,
            "object" => TypeTag::Object,
            "json" => TypeTag::Json,
            _ => return Err(Error::UnknownType(name.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::Int8 => "int8",
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Char8 => "char8",
            TypeTag::Char16 => "char16",
            TypeTag::Char32 => "char32",
            TypeTag::Buffer => "buffer",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Json => "json",
        }
    }
}

/// A field's type declaration: either a bare tag (`"number"`) or a structured descriptor
/// carrying a fixed `size`, array `items`, or a nested `schema`.
///
/// The two shapes are collapsed here, at the declaration boundary; everything past the schema
/// compiler deals in resolved kinds only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    Tag(TypeTag),
    Full(FullDescriptor),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FullDescriptor {
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Fixed payload width: truncate or zero-pad the encoded payload to exactly this many
    /// bytes. Only legal on string and buffer fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Element descriptor, for array fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Descriptor>>,
    /// Child field mapping, for nested object fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaMap>,
}

impl Descriptor {
    pub fn tag(&self) -> TypeTag {
        match self {
            Descriptor::Tag(tag) => *tag,
            Descriptor::Full(full) => full.type_tag,
        }
    }

    pub fn size(&self) -> Option<usize> {
        match self {
            Descriptor::Tag(_) => None,
            Descriptor::Full(full) => full.size,
        }
    }

    pub fn items(&self) -> Option<&Descriptor> {
        match self {
            Descriptor::Tag(_) => None,
            Descriptor::Full(full) => full.items.as_deref(),
        }
    }

    pub fn schema(&self) -> Option<&SchemaMap> {
        match self {
            Descriptor::Tag(_) => None,
            Descriptor::Full(full) => full.schema.as_ref(),
        }
    }

    /// An array of `items` elements.
    pub fn array(items: Descriptor) -> Descriptor {
        Descriptor::Full(FullDescriptor {
            type_tag: TypeTag::Array,
            size: None,
            items: Some(Box::new(items)),
            schema: None,
        })
    }

    /// A nested object with its own field mapping.
    pub fn object(schema: SchemaMap) -> Descriptor {
        Descriptor::Full(FullDescriptor {
            type_tag: TypeTag::Object,
            size: None,
            items: None,
            schema: Some(schema),
        })
    }

    /// A tag with a fixed payload width.
    pub fn sized(tag: TypeTag, size: usize) -> Descriptor {
        Descriptor::Full(FullDescriptor {
            type_tag: tag,
            size: Some(size),
            items: None,
            schema: None,
        })
    }
}

impl From<TypeTag> for Descriptor {
    fn from(tag: TypeTag) -> Descriptor {
        Descriptor::Tag(tag)
    }
}
