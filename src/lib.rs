//! keypack is a compact, schema-driven binary serialization format. A schema maps field
//! names to type descriptors; encoding walks the schema and writes each present field as a
//! `(key index, size indicator, payload)` triple, and decoding walks the triples back into a
//! value object. Nothing about the data is self-describing: field names never appear on the
//! wire and numbers carry no type tag, so the same compiled schema must sit on both sides.
//!
//! What makes the format dense:
//!
//! - Field names shrink to one-byte key indices, assigned from the schema's sorted field
//!   order at compile time.
//! - Numbers are range-checked at encode time and written at the smallest of 1/2/4-byte
//!   two's complement or an 8-byte IEEE-754 double; the decoder recovers the width from the
//!   payload byte count alone.
//! - Absent and null fields take zero bytes.
//!
//! Strings are written as one fixed-width code unit per code point (2 bytes by default;
//! `char8`/`char32` trade range for density), buffers byte-for-byte, arrays as
//! length-prefixed elements, and nested objects as recursively encoded, length-prefixed
//! blobs. All multi-byte wire integers are big-endian.
//!
//! ```
//! use keypack::{keypack, Schema, SchemaMap, TypeTag, Descriptor};
//!
//! let mut raw = SchemaMap::new();
//! raw.insert("id".into(), TypeTag::Number.into());
//! raw.insert("name".into(), TypeTag::String.into());
//! raw.insert("tags".into(), Descriptor::array(TypeTag::String.into()));
//! let schema = Schema::new(&raw)?;
//!
//! let value = keypack!({ "id": 42, "name": "ada", "tags": ["admin"] });
//! let bytes = schema.encode(&value)?;
//! assert_eq!(schema.decode(&bytes)?, value);
//! # Ok::<(), keypack::Error>(())
//! ```
//!
//! Schemas can equally be declared in any serde format:
//!
//! ```
//! # use keypack::{Schema, SchemaMap};
//! let raw: SchemaMap = serde_json::from_str(
//!     r#"{ "pos": {"type": "array", "items": "number"}, "label": "string" }"#,
//! ).unwrap();
//! let schema = Schema::new(&raw).unwrap();
//! ```
//!
//! Encode and decode are pure and synchronous: every call gets its own output buffer, no
//! state is shared between calls, and a compiled [`Schema`] can serve any number of threads
//! concurrently. The decoder trusts its input to come from a matching encoder; truncation
//! surfaces as a structured error, but there is no hardening against adversarial bytes.

mod macros;

mod decode;
mod descriptor;
mod encode;
mod error;
mod primitive;
mod schema;
mod validator;
mod value;

pub mod kind;

pub use self::descriptor::{Descriptor, FullDescriptor, SchemaMap, TypeTag};
pub use self::error::{Error, Result};
pub use self::kind::Kind;
pub use self::schema::Schema;
pub use self::value::Value;

/// Key indices are single bytes, so a schema may declare at most 256 fields.
pub const MAX_FIELDS: usize = 256;
/// Nested schemas may go at most this many levels deep.
pub const MAX_DEPTH: usize = 32;
/// Length-prefixed payloads (strings, buffers, arrays, nested objects) are capped by their
/// 2-byte prefix.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// Encode a value object against a compiled schema. See [`Schema::encode`].
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>> {
    schema.encode(value)
}

/// Decode a buffer produced by [`encode`] with the same schema. See [`Schema::decode`].
pub fn decode(schema: &Schema, data: &[u8]) -> Result<Value> {
    schema.decode(data)
}

/// Advisory type check of a value against a schema. See [`Schema::validate`].
pub fn validate(schema: &Schema, value: &Value) -> Vec<String> {
    schema.validate(value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn free_functions_match_methods() {
        let raw: SchemaMap = serde_json::from_str(r#"{"t": "number"}"#).unwrap();
        let schema = Schema::new(&raw).unwrap();
        let value = keypack!({ "t": 12 });

        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(bytes, schema.encode(&value).unwrap());
        assert_eq!(decode(&schema, &bytes).unwrap(), value);
        assert!(validate(&schema, &value).is_empty());
    }

    #[test]
    fn schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
        assert_send_sync::<Value>();
    }
}
