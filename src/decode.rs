//! The decoder: scans the buffer left to right, consuming one `(key, size, payload)` triple
//! at a time until the buffer is exhausted. Payload width rules mirror the encoder's exactly.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::primitive;
use crate::schema::{ElemCodec, Field, FieldCodec, Schema};
use crate::value::Value;

pub(crate) fn decode(schema: &Schema, data: &[u8]) -> Result<Value> {
    Ok(Value::Object(decode_fields(schema, data)?))
}

fn decode_fields(schema: &Schema, data: &[u8]) -> Result<BTreeMap<String, Value>> {
    let mut map = BTreeMap::new();
    let mut caret = 0;
    while caret < data.len() {
        let index = data[caret] as usize;
        let field = match schema.field(index) {
            Some(field) => field,
            // A key outside the schema means this buffer wasn't produced by a matching
            // schema. Without the field entry the size-indicator width is unknowable, so
            // the scan stops here instead of guessing at framing.
            None => break,
        };
        caret += 1;
        let (payload, rest_at) = split_payload(data, caret, field)?;
        map.insert(field.name.clone(), read_payload(field, payload)?);
        caret = rest_at;
    }
    Ok(map)
}

fn split_payload<'a>(data: &'a [u8], caret: usize, field: &Field) -> Result<(&'a [u8], usize)> {
    let (size, body_at) = if field.codec.kind().length_prefixed() {
        if caret + 2 > data.len() {
            return Err(Error::LengthTooShort {
                step: "length prefix",
                actual: data.len() - caret,
                expected: 2,
            });
        }
        (
            BigEndian::read_u16(&data[caret..caret + 2]) as usize,
            caret + 2,
        )
    } else {
        match data.get(caret) {
            Some(b) => (*b as usize, caret + 1),
            None => {
                return Err(Error::LengthTooShort {
                    step: "size indicator",
                    actual: 0,
                    expected: 1,
                })
            }
        }
    };
    let end = body_at + size;
    if end > data.len() {
        return Err(Error::LengthTooShort {
            step: "field payload",
            actual: data.len() - body_at,
            expected: size,
        });
    }
    Ok((&data[body_at..end], end))
}

fn read_payload(field: &Field, payload: &[u8]) -> Result<Value> {
    Ok(match &field.codec {
        FieldCodec::Boolean => Value::Bool(primitive::decode_bool(payload)?),
        FieldCodec::Number(_) => Value::Number(primitive::decode_number(payload)?),
        FieldCodec::String(width) => {
            let mut s = primitive::decode_str(payload, *width);
            if field.size.is_some() {
                // Declared-width strings come back zero-padded; the pad units aren't data.
                while s.ends_with('\0') {
                    s.pop();
                }
            }
            Value::Str(s)
        }
        FieldCodec::Binary => Value::Bin(payload.to_vec()),
        FieldCodec::Array(elem) => Value::Array(read_elements(payload, *elem)?),
        FieldCodec::Schema(child) => Value::Object(decode_fields(child, payload)?),
        FieldCodec::SchemaArray(child) => {
            let mut items = Vec::new();
            let mut caret = 0;
            while caret < payload.len() {
                let (body, next) = split_element(payload, caret)?;
                items.push(Value::Object(decode_fields(child, body)?));
                caret = next;
            }
            Value::Array(items)
        }
    })
}

fn read_elements(payload: &[u8], elem: ElemCodec) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut caret = 0;
    while caret < payload.len() {
        let (body, next) = split_element(payload, caret)?;
        items.push(match elem {
            ElemCodec::Boolean => Value::Bool(primitive::decode_bool(body)?),
            ElemCodec::Number(_) => Value::Number(primitive::decode_number(body)?),
            ElemCodec::String(width) => Value::Str(primitive::decode_str(body, width)),
        });
        caret = next;
    }
    Ok(items)
}

fn split_element(data: &[u8], caret: usize) -> Result<(&[u8], usize)> {
    if caret + 2 > data.len() {
        return Err(Error::LengthTooShort {
            step: "element length prefix",
            actual: data.len() - caret,
            expected: 2,
        });
    }
    let size = BigEndian::read_u16(&data[caret..caret + 2]) as usize;
    let body_at = caret + 2;
    let end = body_at + size;
    if end > data.len() {
        return Err(Error::LengthTooShort {
            step: "array element",
            actual: data.len() - body_at,
            expected: size,
        });
    }
    Ok((&data[body_at..end], end))
}

#[cfg(test)]
mod test {
    use crate::descriptor::SchemaMap;
    use crate::{keypack, Error, Schema, Value};

    fn schema(json: &str) -> Schema {
        let raw: SchemaMap = serde_json::from_str(json).unwrap();
        Schema::new(&raw).unwrap()
    }

    #[test]
    fn empty_buffer_decodes_to_empty_object() {
        let s = schema(r#"{"t": "number"}"#);
        assert_eq!(s.decode(&[]).unwrap(), Value::Object(Default::default()));
    }

    #[test]
    fn foreign_key_index_halts_the_scan() {
        let s = schema(r#"{"t": "number"}"#);
        // A valid field, then a key no schema entry covers
        let data = [0x00, 0x01, 0x07, 0x09, 0x01, 0x00];
        assert_eq!(s.decode(&data).unwrap(), keypack!({ "t": 7 }));
        // Nothing but the foreign key
        assert_eq!(s.decode(&[0x42]).unwrap(), keypack!({}));
    }

    #[test]
    fn truncated_buffers_error() {
        let s = schema(r#"{"t": "number"}"#);
        // Key with no size indicator
        assert!(matches!(
            s.decode(&[0x00]),
            Err(Error::LengthTooShort { .. })
        ));
        // Size says 4, only 2 bytes follow
        assert!(matches!(
            s.decode(&[0x00, 0x04, 0x01, 0x02]),
            Err(Error::LengthTooShort { .. })
        ));

        let s = schema(r#"{"t": "string"}"#);
        // Length prefix cut in half
        assert!(matches!(
            s.decode(&[0x00, 0x00]),
            Err(Error::LengthTooShort { .. })
        ));
    }

    #[test]
    fn corrupt_number_width_errors() {
        let s = schema(r#"{"t": "number"}"#);
        assert!(matches!(
            s.decode(&[0x00, 0x03, 0x01, 0x02, 0x03]),
            Err(Error::BadEncode(_))
        ));
    }

    #[test]
    fn hand_built_buffer() {
        // The wire contract, spelled out: key 0, 2-byte length 4, "hi" at 2 bytes/char
        let s = schema(r#"{"t": "string"}"#);
        let data = [0x00, 0x00, 0x04, 0x00, 0x68, 0x00, 0x69];
        assert_eq!(s.decode(&data).unwrap(), keypack!({ "t": "hi" }));
    }
}
