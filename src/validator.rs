//! Advisory validation and lossy coercion of values against a compiled schema.
//!
//! `validate` is the sanctioned way to learn about value/schema mismatches before encoding;
//! encode itself stays strict and fails on the first mismatch. `coerce` instead bends each
//! present field to its declared kind so a sloppy value can still travel.

use std::collections::BTreeMap;

use crate::schema::{ElemCodec, Field, FieldCodec, Schema};
use crate::value::Value;

pub(crate) fn validate(schema: &Schema, value: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    match value.as_object() {
        Some(map) => check_fields(&mut warnings, schema, map, ""),
        None => warnings.push(format!("expected an object, got {}", value.kind_name())),
    }
    warnings
}

fn check_fields(
    warnings: &mut Vec<String>,
    schema: &Schema,
    map: &BTreeMap<String, Value>,
    prefix: &str,
) {
    for field in schema.fields() {
        // Nulls and absences are skipped by the encoder, so they're not worth a warning.
        let value = match map.get(&field.name) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        check_field(warnings, field, value, &path);
    }
}

fn check_field(warnings: &mut Vec<String>, field: &Field, value: &Value, path: &str) {
    match &field.codec {
        FieldCodec::Boolean => {
            if !value.is_bool() {
                warn(warnings, path, value, "boolean");
            }
        }
        FieldCodec::Number(_) => {
            if !value.is_number() {
                warn(warnings, path, value, "number");
            }
        }
        FieldCodec::String(_) => {
            if !value.is_str() {
                warn(warnings, path, value, "string");
            }
        }
        FieldCodec::Binary => {
            if !value.is_bin() {
                warn(warnings, path, value, "buffer");
            }
        }
        FieldCodec::Array(elem) => match value.as_array() {
            None => warn(warnings, path, value, "array"),
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let ok = match elem {
                        ElemCodec::Boolean => item.is_bool(),
                        ElemCodec::Number(_) => item.is_number(),
                        ElemCodec::String(_) => item.is_str(),
                    };
                    if !ok {
                        let expected = match elem {
                            ElemCodec::Boolean => "boolean",
                            ElemCodec::Number(_) => "number",
                            ElemCodec::String(_) => "string",
                        };
                        warn(warnings, &format!("{}[{}]", path, i), item, expected);
                    }
                }
            }
        },
        FieldCodec::Schema(child) => match value.as_object() {
            None => warn(warnings, path, value, "object"),
            Some(map) => check_fields(warnings, child, map, path),
        },
        FieldCodec::SchemaArray(child) => match value.as_array() {
            None => warn(warnings, path, value, "array"),
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let path = format!("{}[{}]", path, i);
                    match item.as_object() {
                        None => warn(warnings, &path, item, "object"),
                        Some(map) => check_fields(warnings, child, map, &path),
                    }
                }
            }
        },
    }
}

fn warn(warnings: &mut Vec<String>, path: &str, value: &Value, expected: &str) {
    warnings.push(format!("{}: \"{}\" is not a {}", path, value, expected));
}

pub(crate) fn coerce(schema: &Schema, value: &Value) -> Value {
    let map = match value.as_object() {
        Some(map) => map,
        None => return Value::Object(BTreeMap::new()),
    };
    let mut out = BTreeMap::new();
    for field in schema.fields() {
        let value = match map.get(&field.name) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        out.insert(field.name.clone(), coerce_field(&field.codec, value));
    }
    Value::Object(out)
}

fn coerce_field(codec: &FieldCodec, value: &Value) -> Value {
    match codec {
        FieldCodec::Boolean => Value::Bool(truthy(value)),
        FieldCodec::Number(_) => Value::Number(to_number(value)),
        FieldCodec::String(_) => Value::Str(value.to_string()),
        FieldCodec::Binary => Value::Bin(match value {
            Value::Bin(b) => b.clone(),
            Value::Str(s) => s.clone().into_bytes(),
            _ => Vec::new(),
        }),
        FieldCodec::Array(elem) => {
            // Scalars get wrapped rather than dropped
            let items = match value.as_array() {
                Some(items) => items.to_vec(),
                None => vec![value.clone()],
            };
            Value::Array(items.iter().map(|item| coerce_elem(*elem, item)).collect())
        }
        FieldCodec::Schema(child) => coerce(child, value),
        FieldCodec::SchemaArray(child) => {
            let items = match value.as_array() {
                Some(items) => items.to_vec(),
                None => vec![value.clone()],
            };
            Value::Array(items.iter().map(|item| coerce(child, item)).collect())
        }
    }
}

fn coerce_elem(elem: ElemCodec, value: &Value) -> Value {
    match elem {
        ElemCodec::Boolean => Value::Bool(truthy(value)),
        ElemCodec::Number(_) => Value::Number(to_number(value)),
        ElemCodec::String(_) => Value::Str(value.to_string()),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Str(s) => !s.is_empty(),
        Value::Bin(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => *b as u8 as f64,
        Value::Number(n) => *n,
        Value::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Bin(_) | Value::Array(_) | Value::Object(_) => f64::NAN,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

#[cfg(test)]
mod test {
    use crate::descriptor::SchemaMap;
    use crate::{keypack, Schema, Value};

    fn schema(json: &str) -> Schema {
        let raw: SchemaMap = serde_json::from_str(json).unwrap();
        Schema::new(&raw).unwrap()
    }

    mod validate {
        use super::*;

        #[test]
        fn warning_format() {
            let s = schema(r#"{"a": "boolean"}"#);
            let warnings = s.validate(&keypack!({ "a": "john" }));
            assert_eq!(warnings, vec![r#"a: "john" is not a boolean"#.to_string()]);
        }

        #[test]
        fn clean_value_yields_no_warnings() {
            let s = schema(r#"{"a": "boolean", "b": "string", "c": "number"}"#);
            let warnings = s.validate(&keypack!({ "a": false, "b": "ok", "c": 3.5 }));
            assert!(warnings.is_empty());
        }

        #[test]
        fn null_and_absent_ignored() {
            let s = schema(r#"{"a": "boolean", "b": "string"}"#);
            assert!(s.validate(&keypack!({ "a": null })).is_empty());
        }

        #[test]
        fn nested_paths() {
            let s = schema(
                r#"{"o": {"type": "object", "schema": {"n": "number"}},
                    "v": {"type": "array", "items": "number"}}"#,
            );
            let warnings = s.validate(&keypack!({
                "o": { "n": "oops" },
                "v": [1, "two", 3],
            }));
            assert_eq!(warnings.len(), 2);
            assert!(warnings.iter().any(|w| w.starts_with("o.n:")));
            assert!(warnings.iter().any(|w| w.starts_with("v[1]:")));
        }

        #[test]
        fn non_object_root() {
            let s = schema(r#"{"a": "boolean"}"#);
            let warnings = s.validate(&Value::Number(1.0));
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("expected an object"));
        }
    }

    mod coerce {
        use super::*;

        #[test]
        fn scalars() {
            let s = schema(r#"{"a": "boolean", "b": "number", "c": "string"}"#);
            let out = s.coerce(&keypack!({ "a": "yes", "b": "42.5", "c": 9 }));
            assert_eq!(out, keypack!({ "a": true, "b": 42.5, "c": "9" }));
        }

        #[test]
        fn unparsable_and_non_finite_numbers_become_zero() {
            let s = schema(r#"{"b": "number"}"#);
            assert_eq!(s.coerce(&keypack!({ "b": "smith" })), keypack!({ "b": 0 }));
            assert_eq!(s.coerce(&keypack!({ "b": f64::NAN })), keypack!({ "b": 0 }));
        }

        #[test]
        fn wraps_scalars_into_arrays() {
            let s = schema(r#"{"v": {"type": "array", "items": "number"}}"#);
            assert_eq!(s.coerce(&keypack!({ "v": 5 })), keypack!({ "v": [5] }));
        }

        #[test]
        fn coerced_value_encodes() {
            let s = schema(r#"{"a": "boolean", "b": "number", "v": {"type": "array", "items": "string"}}"#);
            let sloppy = keypack!({ "a": 1, "b": "7", "v": "solo" });
            let out = s.coerce(&sloppy);
            let enc = s.encode(&out).unwrap();
            assert_eq!(
                s.decode(&enc).unwrap(),
                keypack!({ "a": true, "b": 7, "v": ["solo"] })
            );
        }

        #[test]
        fn drops_unknown_fields() {
            let s = schema(r#"{"a": "number"}"#);
            let out = s.coerce(&keypack!({ "a": 1, "zz": true }));
            assert_eq!(out, keypack!({ "a": 1 }));
        }
    }
}
