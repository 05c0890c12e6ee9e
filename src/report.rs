//! Serialisable snapshot of a built tree.
//!
//! The tree itself borrows from its arena and holds trait objects, so it is not serialisable
//! directly. A report copies out names, paths, raw content and mapped states for printing or
//! comparison.

use crate::mapped::MappedState;
use crate::overrides::{Override, OverrideValue, Overrides};
use crate::section::{Section, SectionTree};
use crate::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One section with its overrides and children.
pub struct SectionReport {
    /// Name within the parent.
    pub name: String,
    /// Dotted path from the root.
    pub path: String,
    /// Whether the section has no children.
    pub is_leaf: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Stacks bound at this section.
    pub overrides: Vec<StackReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Child sections in document order.
    pub sections: Vec<SectionReport>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Every instance bound under one normalized key.
pub struct StackReport {
    /// Normalized key.
    pub key: String,
    /// Instances in push order.
    pub instances: Vec<OverrideReport>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One handler instance.
pub struct OverrideReport {
    /// Literal document key that triggered the instance.
    pub matched_key: String,
    /// Dotted identity path.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Raw content, for plain and raw instances.
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// States, for mapped instances.
    pub states: Option<Vec<StateReport>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One state of a mapped instance.
pub struct StateReport {
    /// Member stacks in first-binding order.
    pub members: Vec<StackReport>,
}

impl SectionReport {
    #[must_use]
    /// Snapshot `section` and everything below it.
    pub fn new(section: Section<'_>) -> Self {
        Self {
            name: section.name().to_string(),
            path: section.resolve_path(),
            is_leaf: section.is_leaf(),
            overrides: stacks(section.overrides()),
            sections: section.children().map(Self::new).collect(),
        }
    }

    #[must_use]
    /// Snapshot a whole tree.
    pub fn from_tree(tree: &SectionTree) -> Self {
        Self::new(tree.root())
    }

    #[must_use]
    /// Paths of every section without children, depth-first.
    pub fn leaf_paths(&self) -> Vec<&str> {
        if self.sections.is_empty() {
            return vec![self.path.as_str()];
        }
        self.sections.iter().flat_map(Self::leaf_paths).collect()
    }
}

impl OverrideReport {
    #[must_use]
    /// Snapshot one instance.
    pub fn new(instance: &Override) -> Self {
        let (content, states) = match instance.value() {
            OverrideValue::Mapped(mapped) => {
                (None, Some(mapped.iter().map(StateReport::new).collect()))
            }
            OverrideValue::Plain(_) | OverrideValue::Raw => {
                (Some(instance.content().clone()), None)
            }
        };
        Self {
            matched_key: instance.matched_key().to_string(),
            path: instance.path().to_string(),
            content,
            states,
        }
    }
}

impl StateReport {
    #[must_use]
    /// Snapshot one state.
    pub fn new(state: &MappedState) -> Self {
        Self {
            members: stacks(state.members()),
        }
    }
}

fn stacks(overrides: &Overrides) -> Vec<StackReport> {
    overrides
        .iter()
        .map(|(key, stack)| StackReport {
            key: key.clone(),
            instances: stack.iter().map(OverrideReport::new).collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/report.rs"]
mod tests;
