//! Section representation for resolved documents.
//!
//! A section is one named division of a document: every mapping key that is not an override key
//! opens a child section. Sections live in an arena owned by [`SectionTree`] and refer to their
//! parent and children by [`SectionId`], so back-references never own anything. Read access goes
//! through the copyable [`Section`] handle.

use crate::context::Context;
use crate::overrides::{Override, Overrides};
use crate::stack::Stack;
use crate::value::normalize_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Index of a section in its tree's arena.
pub struct SectionId(pub(crate) usize);

impl SectionId {
    /// The root of every tree.
    pub const ROOT: Self = Self(0);

    #[must_use]
    /// Position in the arena, which is also construction order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
/// Hierarchical document division with its bound overrides.
pub(crate) struct SectionNode {
    /// Key this section was opened by.
    pub name: String,
    /// Containing section in the hierarchy.
    pub parent: Option<SectionId>,
    /// Directly nested sections, in document order.
    pub children: Vec<SectionId>,
    /// Overrides bound directly at this section.
    pub overrides: Overrides,
}

#[derive(Debug)]
/// Arena of every section built from one document. Immutable once built.
pub struct SectionTree {
    pub(crate) nodes: Vec<SectionNode>,
    pub(crate) context: Option<Context>,
}

impl SectionTree {
    #[must_use]
    /// The root section.
    pub fn root(&self) -> Section<'_> {
        Section {
            tree: self,
            id: SectionId::ROOT,
        }
    }

    #[must_use]
    /// The section with `id`, if it belongs to this tree.
    pub fn get(&self, id: SectionId) -> Option<Section<'_>> {
        (id.0 < self.nodes.len()).then_some(Section { tree: self, id })
    }

    #[must_use]
    /// Number of sections, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every section in construction order (pre-order, document order).
    pub fn sections(&self) -> impl Iterator<Item = Section<'_>> + '_ {
        (0..self.nodes.len()).map(move |index| Section {
            tree: self,
            id: SectionId(index),
        })
    }

    #[must_use]
    /// The shared context supplied at construction.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    #[must_use]
    /// Sections without children, depth-first. See [`Section::leaf_sections`].
    pub fn leaf_sections(&self) -> Vec<Section<'_>> {
        self.root().leaf_sections()
    }
}

#[derive(Debug, Clone, Copy)]
/// Read handle onto one section of a [`SectionTree`].
pub struct Section<'t> {
    tree: &'t SectionTree,
    id: SectionId,
}

impl<'t> Section<'t> {
    fn node(&self) -> &'t SectionNode {
        &self.tree.nodes[self.id.0]
    }

    fn at(&self, id: SectionId) -> Section<'t> {
        Section { tree: self.tree, id }
    }

    #[must_use]
    /// Arena id of this section.
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    /// The tree this section belongs to.
    pub fn tree(&self) -> &'t SectionTree {
        self.tree
    }

    #[must_use]
    /// Name within the parent: the key that opened it, or the root name.
    pub fn name(&self) -> &'t str {
        &self.node().name
    }

    #[must_use]
    /// The containing section, `None` for the root.
    pub fn parent(&self) -> Option<Section<'t>> {
        self.node().parent.map(|id| self.at(id))
    }

    #[must_use]
    /// The topmost ancestor.
    pub fn root(&self) -> Section<'t> {
        self.tree.root()
    }

    /// Directly nested sections in document order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = Section<'t>> + 't {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |id| Section { tree, id: *id })
    }

    #[must_use]
    /// Whether this section has no children. It may still carry overrides.
    pub fn is_leaf(&self) -> bool {
        self.node().children.is_empty()
    }

    #[must_use]
    /// Every section under (and including) this one that has no children, depth-first.
    pub fn leaf_sections(&self) -> Vec<Section<'t>> {
        let mut leaves = Vec::new();
        let mut pending = vec![self.id];
        while let Some(id) = pending.pop() {
            let node = &self.tree.nodes[id.0];
            if node.children.is_empty() {
                leaves.push(self.at(id));
            } else {
                pending.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    #[must_use]
    /// Distinct parents of [`Self::leaf_sections`], in first-seen order.
    pub fn branch_sections(&self) -> Vec<Section<'t>> {
        let mut branches: Vec<Section<'t>> = Vec::new();
        for leaf in self.leaf_sections() {
            if let Some(parent) = leaf.parent() {
                if !branches.iter().any(|seen| seen.id == parent.id) {
                    branches.push(parent);
                }
            }
        }
        branches
    }

    #[must_use]
    /// Number of ancestors above this section.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.node().parent, |id| self.tree.nodes[id.0].parent).count()
    }

    #[must_use]
    /// Names from the root down to this section, joined with `.`.
    pub fn resolve_path(&self) -> String {
        let mut names = vec![self.name()];
        let mut cursor = self.node().parent;
        while let Some(id) = cursor {
            let node = &self.tree.nodes[id.0];
            names.push(&node.name);
            cursor = node.parent;
        }
        names.reverse();
        names.join(".")
    }

    #[must_use]
    /// Every override stack bound directly here, keyed by normalized name.
    pub fn overrides(&self) -> &'t Overrides {
        &self.node().overrides
    }

    #[must_use]
    /// The stack bound here under `key` (normalized).
    pub fn stack(&self, key: &str) -> Option<&'t Stack<Override>> {
        self.node().overrides.get(&normalize_key(key))
    }

    #[must_use]
    /// The latest instance bound here under `key`; `None` when never bound at this section.
    pub fn get(&self, key: &str) -> Option<&'t Override> {
        self.stack(key).and_then(Stack::latest)
    }

    #[must_use]
    /// The stack under `key` bound here or at the nearest ancestor that binds it.
    pub fn find_stack(&self, key: &str) -> Option<&'t Stack<Override>> {
        let key = normalize_key(key);
        let mut cursor = Some(self.id);
        while let Some(id) = cursor {
            let node = &self.tree.nodes[id.0];
            if let Some(stack) = node.overrides.get(&key) {
                return Some(stack);
            }
            cursor = node.parent;
        }
        None
    }

    #[must_use]
    /// Like [`Self::get`], but falls back to the nearest ancestor binding `key`.
    pub fn find(&self, key: &str) -> Option<&'t Override> {
        self.find_stack(key).and_then(Stack::latest)
    }

    #[must_use]
    /// The tree's shared context.
    pub fn context(&self) -> Option<&'t Context> {
        self.tree.context.as_ref()
    }
}

impl PartialEq for Section<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Section<'_> {}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
