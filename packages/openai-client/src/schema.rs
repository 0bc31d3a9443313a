//! Type-safe schema generation for OpenAI structured outputs.
//!
//! Uses `schemars` to derive JSON schemas from Rust types, then
//! reshapes them for OpenAI's strict mode.

use schemars::{schema_for, JsonSchema};

/// Trait for types usable as OpenAI structured output.
///
/// Blanket-implemented for any `JsonSchema` type.
pub trait StructuredOutput: JsonSchema {
    /// Generate an OpenAI-compatible JSON schema for this type.
    ///
    /// OpenAI strict mode requires `additionalProperties: false` on
    /// every object, every property listed in `required`, and fully
    /// inlined schemas (no `$ref`). The schemars output is rewritten
    /// to satisfy all three.
    fn openai_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        fix_object_schemas(&mut value);
        inline_refs(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }
}

impl<T: JsonSchema> StructuredOutput for T {}

/// Add `additionalProperties: false` and promote every property to
/// `required`, recursively.
fn fix_object_schemas(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), serde_json::Value::Array(all_keys));
                }
            }
            for (_, v) in map.iter_mut() {
                fix_object_schemas(v);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                fix_object_schemas(item);
            }
        }
        _ => {}
    }
}

/// Inline every `#/definitions/...` reference; OpenAI's validator
/// does not follow refs.
fn inline_refs(value: &mut serde_json::Value) {
    let definitions = match value {
        serde_json::Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(definitions) = definitions {
        inline_refs_recursive(value, &definitions);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(definition) = definitions.get(type_name) {
                        *value = definition.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }
            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}
