// Response key normalization
//
// The API mixes snake_case (`team_name`), kebab-case (`resource-types`)
// and the odd camelCase key. Every successful body is rewritten to
// camelCase keys before callers or entity types see it.

use convert_case::{Case, Casing};
use serde_json::Value;

/// Recursively rewrite every object key in `value` to camelCase.
///
/// Arrays keep their order and every element is normalized on its own;
/// scalars pass through. Normalizing twice is the same as normalizing once.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (camel_case(&key), normalize(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        scalar => scalar,
    }
}

/// Convert a single key to camelCase.
///
/// Words split on separators and case changes, including acronym runs
/// (`HTTPServer` -> `httpServer`).
pub fn camel_case(key: &str) -> String {
    key.to_case(Case::Camel)
}
