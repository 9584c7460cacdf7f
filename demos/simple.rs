use keypack::{keypack, Schema, SchemaMap};

fn main() {
    // Declare a schema for user records. JSON is just one way in; any serde
    // format or hand-built SchemaMap works the same.
    let raw: SchemaMap = serde_json::from_str(
        r#"{
            "id": "number",
            "name": "string",
            "admin": "boolean",
            "scores": {"type": "array", "items": "number"},
            "address": {"type": "object", "schema": {
                "street": "string",
                "zip": {"type": "string", "size": 10}
            }}
        }"#,
    )
    .unwrap();
    let schema = Schema::new(&raw).unwrap();

    let user = keypack!({
        "id": 90,
        "name": "Ada Lovelace",
        "admin": true,
        "scores": [12, 35.5, -7],
        "address": {
            "street": "12 Analytical Way",
            "zip": "10115"
        }
    });

    // Warnings are advisory; this value is clean.
    assert!(schema.validate(&user).is_empty());

    let bytes = schema.encode(&user).unwrap();
    println!("encoded {} bytes", bytes.len());

    for (field, size) in schema.sizes(&user).unwrap() {
        println!("  {:>8}: {} payload bytes", field, size);
    }

    let back = schema.decode(&bytes).unwrap();
    assert_eq!(back, user);
    println!("decoded: {}", back);
}
