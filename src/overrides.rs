//! Override instances: what a handler type produces for one occurrence of its key.

use crate::context::Context;
use crate::handler::OverrideObject;
use crate::mapped::MappedOverride;
use crate::section::SectionId;
use crate::stack::Stack;
use crate::value::{get_normalized, normalize_key, Value};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;

/// Normalized key to the stack of instances bound under it, in first-binding order.
pub type Overrides = IndexMap<String, Stack<Override>>;

#[derive(Debug)]
/// The resolved form of an instance.
pub enum OverrideValue {
    /// Built by a plain handler's factory.
    Plain(Box<dyn OverrideObject>),
    /// Resolved against a member vocabulary.
    Mapped(MappedOverride),
    /// A bare scalar wrapped as-is.
    Raw,
}

#[derive(Debug)]
/// One handler instance bound at a section or inside a mapped state.
pub struct Override {
    pub(crate) key: String,
    pub(crate) matched_key: String,
    pub(crate) content: Value,
    pub(crate) owner: SectionId,
    pub(crate) path: String,
    pub(crate) lineage: Vec<String>,
    pub(crate) context: Option<Context>,
    pub(crate) value: OverrideValue,
}

impl Override {
    #[must_use]
    /// Normalized key this instance is stacked under.
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    /// The literal document key that triggered this instance.
    ///
    /// For aliased handlers this tells `message` and `message-alt` apart. Instances bound
    /// implicitly (short form, raw scalars) carry the member's primary key.
    pub fn matched_key(&self) -> &str {
        &self.matched_key
    }

    #[must_use]
    /// The raw value handed to the handler.
    pub fn content(&self) -> &Value {
        &self.content
    }

    #[must_use]
    /// The section this instance was bound under.
    pub fn owner(&self) -> SectionId {
        self.owner
    }

    #[must_use]
    /// Dotted identity path: owning section path, enclosing member keys, then this key.
    ///
    /// Identical for every instance stacked in one slot; use stack position for identity.
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    /// Matched keys of the mapped overrides enclosing this one, outermost first.
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    #[must_use]
    /// The tree's shared context, if one was supplied.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    #[must_use]
    /// The resolved form of this instance.
    pub fn value(&self) -> &OverrideValue {
        &self.value
    }

    #[must_use]
    /// The mapped form, if this instance came from a mapped handler.
    pub fn as_mapped(&self) -> Option<&MappedOverride> {
        match &self.value {
            OverrideValue::Mapped(mapped) => Some(mapped),
            _ => None,
        }
    }

    #[must_use]
    /// Whether this instance wraps a bare scalar.
    pub fn is_raw(&self) -> bool {
        matches!(self.value, OverrideValue::Raw)
    }

    #[must_use]
    /// The plain handler's domain object as its concrete type.
    pub fn downcast_ref<T: OverrideObject>(&self) -> Option<&T> {
        match &self.value {
            OverrideValue::Plain(object) => {
                let object: &dyn OverrideObject = &**object;
                let object: &dyn std::any::Any = object;
                object.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    #[must_use]
    /// Attribute lookup: the handler's computed attribute first, then the content entry whose
    /// normalized key equals the normalized `name`.
    pub fn get(&self, name: &str) -> Option<Cow<'_, Value>> {
        if let OverrideValue::Plain(object) = &self.value {
            if let Some(value) = object.attr(&normalize_key(name)) {
                return Some(Cow::Owned(value));
            }
        }
        get_normalized(&self.content, name).map(Cow::Borrowed)
    }

    #[must_use]
    /// String attribute lookup; `None` when absent or not a string.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name)?.as_str().map(ToString::to_string)
    }

    #[must_use]
    /// Display form: the handler's own, else string content verbatim, else compact JSON.
    pub fn display(&self) -> String {
        if let OverrideValue::Plain(object) = &self.value {
            if let Some(shown) = object.display() {
                return shown;
            }
        }
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[path = "tests/overrides.rs"]
mod tests;
