//! Execution namespace
//!
//! The one shared mutable resource of the pipeline. It is owned by the
//! shell and passed explicitly to every component that needs it; nothing in
//! this crate reaches for a global.

use indexmap::IndexMap;

use crate::engine::value::Value;

/// Insertion-ordered mapping from identifier to runtime value.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: IndexMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Remove a binding, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Merge a batch of bindings in.
    pub fn extend(&mut self, bindings: impl IntoIterator<Item = (String, Value)>) {
        self.bindings.extend(bindings);
    }
}
