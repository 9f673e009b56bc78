//! JSON schema normalisation for OpenAI structured outputs.
//!
//! Schemas derived with `schemars` are rewritten into the subset OpenAI
//! accepts in strict mode.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemars::{schema_for, JsonSchema};
//! use openai_client::strict_schema;
//!
//! #[derive(JsonSchema)]
//! struct Verdict {
//!     summary: String,
//!     score: i64,
//! }
//!
//! let schema = strict_schema(serde_json::to_value(schema_for!(Verdict))?);
//! ```

use serde_json::{Map, Value};

/// Normalise a draft-07 schema document for strict mode.
///
/// Drops `$schema` and inlines `definitions`, then enforces:
/// 1. `additionalProperties: false` on every object schema
/// 2. every property listed in `required`, nullable ones included
/// 3. no `$ref` indirection
/// 4. no integer `format` annotations (`int64`, `uint8`, ...)
///
/// Already-strict input is unchanged.
pub fn strict_schema(mut value: Value) -> Value {
    let definitions = match &mut value {
        Value::Object(map) => {
            map.remove("$schema");
            map.remove("definitions")
        }
        _ => None,
    };

    let definitions = definitions.unwrap_or(Value::Object(Map::new()));
    strictify(&mut value, &definitions);
    value
}

/// Rewrite a schema node (and everything under it) for strict mode.
///
/// `$ref`s into `#/definitions/` are replaced by a copy of their target,
/// which is then rewritten in turn.
fn strictify(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();
            if let Some(target) = target {
                *value = target;
                strictify(value, definitions);
                return;
            }

            let is_object = map.get("type") == Some(&Value::String("object".to_string()));
            if is_object {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                let required: Vec<Value> = match map.get("properties") {
                    Some(Value::Object(props)) => {
                        props.keys().map(|k| Value::String(k.clone())).collect()
                    }
                    _ => Vec::new(),
                };
                map.insert("required".to_string(), Value::Array(required));
            }

            if is_numeric(map) {
                map.remove("format");
            }

            for (_, child) in map.iter_mut() {
                strictify(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strictify(item, definitions);
            }
        }
        _ => {}
    }
}

fn is_numeric(map: &Map<String, Value>) -> bool {
    let numeric = |t: &Value| matches!(t.as_str(), Some("integer") | Some("number"));
    match map.get("type") {
        Some(Value::Array(types)) => types.iter().any(numeric),
        Some(t) => numeric(t),
        None => false,
    }
}
