//! Shared key/value state threaded through one tree.
//!
//! A context is supplied once at the root and handed by reference to every section and override
//! built under it, so any node can leave state for any other node. The engine itself never reads
//! or writes it and imposes no ordering on access beyond the lock held by each call.

use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
/// Cheaply cloneable handle to one shared store; clones see the same entries.
pub struct Context {
    inner: Arc<RwLock<IndexMap<String, Value>>>,
}

impl Context {
    #[must_use]
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    /// Clone of the entry under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Set `key`, returning the previous entry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Remove `key`, returning its entry.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().shift_remove(key)
    }

    #[must_use]
    /// Whether `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    #[must_use]
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Apply `f` to a copy of the entry under `key` (`Null` if absent) and store the result.
    ///
    /// No lock is held while `f` runs, so `f` may read or write the context itself. A write to
    /// `key` made from inside `f` is overwritten when `f` returns.
    pub fn update<R>(&self, key: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut value = self.get(key).unwrap_or(Value::Null);
        let outcome = f(&mut value);
        self.inner.write().insert(key.to_string(), value);
        outcome
    }

    #[must_use]
    /// Whether two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
#[path = "tests/context.rs"]
mod tests;
