//! Ordered multi-value slot.
//!
//! When an override key recurs within one logical slot (sibling sequence items, repeated
//! fragments inside a mapped override) nothing is overwritten: every instance is pushed onto the
//! slot's stack in document order.

#[derive(Debug, Clone, PartialEq)]
/// Every instance bound to one slot, in the order they were encountered.
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    #[must_use]
    /// An empty stack.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an instance. Stacks only grow while a tree is being built.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    #[must_use]
    /// Number of pushed instances.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    /// Whether nothing was ever pushed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    /// The most recently pushed instance.
    pub fn latest(&self) -> Option<&T> {
        self.items.last()
    }

    #[must_use]
    /// The instance at `index` in push order.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Instances in push order. Restartable: every call yields the same sequence.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    /// Borrow all instances as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "tests/stack.rs"]
mod tests;
