//! The encoder: walks compiled fields in ascending key-index order and appends one
//! `(key, size, payload)` triple per present field.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::primitive;
use crate::schema::{ElemCodec, Field, FieldCodec, Schema};
use crate::value::Value;
use crate::MAX_FIELD_LEN;

pub(crate) fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>> {
    let map = as_root(value)?;
    let mut buf = Vec::new();
    encode_fields(&mut buf, schema, map)?;
    Ok(buf)
}

fn as_root(value: &Value) -> Result<&BTreeMap<String, Value>> {
    value.as_object().ok_or_else(|| Error::BadValue {
        field: "(root)".to_string(),
        expected: "object",
        found: value.kind_name(),
    })
}

fn encode_fields(
    buf: &mut Vec<u8>,
    schema: &Schema,
    map: &BTreeMap<String, Value>,
) -> Result<()> {
    for (index, field) in schema.fields().iter().enumerate() {
        // Null and absent both mean "omit"; the wire has no null representation.
        let value = match map.get(&field.name) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        buf.push(index as u8);
        if field.codec.kind().length_prefixed() {
            let size_at = buf.len();
            buf.extend_from_slice(&[0, 0]);
            let start = buf.len();
            write_payload(buf, field, value)?;
            let len = buf.len() - start;
            if len > MAX_FIELD_LEN {
                return Err(Error::LengthTooLong {
                    max: MAX_FIELD_LEN,
                    actual: len,
                });
            }
            BigEndian::write_u16(&mut buf[size_at..start], len as u16);
        } else {
            // Scalar kinds get a single count byte; the count doubles as the decoder's only
            // record of the numeric width.
            let size_at = buf.len();
            buf.push(0);
            let start = buf.len();
            write_payload(buf, field, value)?;
            buf[size_at] = (buf.len() - start) as u8;
        }
    }
    Ok(())
}

/// Write one field's payload bytes (no key or size framing), honoring the declared fixed
/// size if any. Also backs the `sizes()` insight helper.
pub(crate) fn write_payload(buf: &mut Vec<u8>, field: &Field, value: &Value) -> Result<()> {
    let start = buf.len();
    match &field.codec {
        FieldCodec::Boolean => {
            let v = value
                .as_bool()
                .ok_or_else(|| mismatch(field, "boolean", value))?;
            primitive::encode_bool(buf, v);
        }
        FieldCodec::Number(width) => {
            let v = value
                .as_f64()
                .ok_or_else(|| mismatch(field, "number", value))?;
            primitive::encode_number(buf, v, *width);
        }
        FieldCodec::String(width) => {
            let v = value
                .as_str()
                .ok_or_else(|| mismatch(field, "string", value))?;
            primitive::encode_str(buf, v, *width);
        }
        FieldCodec::Binary => {
            let v = value
                .as_slice()
                .ok_or_else(|| mismatch(field, "buffer", value))?;
            buf.extend_from_slice(v);
        }
        FieldCodec::Array(elem) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(field, "array", value))?;
            for item in items {
                write_element(buf, field, *elem, item)?;
            }
        }
        FieldCodec::Schema(child) => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(field, "object", value))?;
            encode_fields(buf, child, map)?;
        }
        FieldCodec::SchemaArray(child) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(field, "array", value))?;
            for item in items {
                let map = item
                    .as_object()
                    .ok_or_else(|| mismatch(field, "object", item))?;
                let size_at = buf.len();
                buf.extend_from_slice(&[0, 0]);
                let elem_start = buf.len();
                encode_fields(buf, child, map)?;
                finish_element(buf, size_at, elem_start)?;
            }
        }
    }
    if let Some(size) = field.size {
        primitive::fit_width(buf, start, size);
    }
    Ok(())
}

fn write_element(buf: &mut Vec<u8>, field: &Field, elem: ElemCodec, item: &Value) -> Result<()> {
    let size_at = buf.len();
    buf.extend_from_slice(&[0, 0]);
    let start = buf.len();
    match elem {
        ElemCodec::Boolean => {
            let v = item
                .as_bool()
                .ok_or_else(|| mismatch(field, "boolean", item))?;
            primitive::encode_bool(buf, v);
        }
        ElemCodec::Number(width) => {
            let v = item
                .as_f64()
                .ok_or_else(|| mismatch(field, "number", item))?;
            primitive::encode_number(buf, v, width);
        }
        ElemCodec::String(width) => {
            let v = item
                .as_str()
                .ok_or_else(|| mismatch(field, "string", item))?;
            primitive::encode_str(buf, v, width);
        }
    }
    finish_element(buf, size_at, start)
}

fn finish_element(buf: &mut Vec<u8>, size_at: usize, start: usize) -> Result<()> {
    let len = buf.len() - start;
    if len > MAX_FIELD_LEN {
        return Err(Error::LengthTooLong {
            max: MAX_FIELD_LEN,
            actual: len,
        });
    }
    BigEndian::write_u16(&mut buf[size_at..start], len as u16);
    Ok(())
}

pub(crate) fn sizes(schema: &Schema, value: &Value) -> Result<BTreeMap<String, usize>> {
    let map = as_root(value)?;
    let mut out = BTreeMap::new();
    for field in schema.fields() {
        let value = match map.get(&field.name) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        let mut buf = Vec::new();
        write_payload(&mut buf, field, value)?;
        out.insert(field.name.clone(), buf.len());
    }
    Ok(out)
}

fn mismatch(field: &Field, expected: &'static str, value: &Value) -> Error {
    Error::BadValue {
        field: field.name.clone(),
        expected,
        found: value.kind_name(),
    }
}
