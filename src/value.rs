//! Raw document content as handed over by a YAML/JSON decoder.
//!
//! The engine never parses text itself. Whatever decoder the caller uses must produce a
//! [`Value`] tree; with `preserve_order` enabled, mapping keys iterate in declaration order,
//! which is the order overrides are bound and sections are created in.

pub use serde_json::{Map, Value};

/// Fold a document key onto the identifier convention used for lookups.
///
/// Hyphens are significant in documents (`message-alt`) but lookups use underscores
/// (`message_alt`), so both sides of every comparison go through this.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

/// Whether two keys are equal once normalized.
#[must_use]
pub fn keys_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().zip(b.chars()).all(|(x, y)| fold(x) == fold(y))
}

fn fold(c: char) -> char {
    if c == '-' {
        '_'
    } else {
        c
    }
}

/// Short human name of a value's shape, used in error messages.
#[must_use]
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Whether a value is a leaf scalar (anything but null, a mapping, or a sequence).
#[must_use]
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Look up a mapping entry by normalized key.
#[must_use]
pub fn get_normalized<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find_map(|(key, entry)| keys_match(key, name).then_some(entry))
}
