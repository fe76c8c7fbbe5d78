//! In-memory implementation of `DocumentStore`.
//!
//! `InMemoryStore` keeps the whole document tree as one `serde_json::Value`
//! behind a `Mutex`. `JsonFileStore` shares the same tree operations and adds
//! persistence on top.

use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use tracing::debug;

use uvv_contracts::error::{UvvError, UvvResult};
use uvv_core::traits::DocumentStore;

use crate::tree;

/// A path-addressed JSON document store held entirely in memory.
pub struct InMemoryStore {
    state: Mutex<Value>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Create a store seeded with `root` as the whole document tree.
    pub fn from_value(root: Value) -> Self {
        Self {
            state: Mutex::new(root),
        }
    }

    /// A copy of the whole document tree.
    pub fn snapshot(&self) -> UvvResult<Value> {
        Ok(self.lock("")?.clone())
    }

    fn lock(&self, path: &str) -> UvvResult<MutexGuard<'_, Value>> {
        self.state.lock().map_err(|e| UvvError::Store {
            path: path.to_string(),
            reason: format!("store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryStore {
    fn get(&self, path: &str) -> UvvResult<Option<Value>> {
        let root = self.lock(path)?;
        Ok(tree::get(&root, path).filter(|v| !v.is_null()).cloned())
    }

    fn set(&self, path: &str, value: Value) -> UvvResult<()> {
        debug!(path = %path, "set");
        let mut root = self.lock(path)?;
        tree::set(&mut root, path, value);
        Ok(())
    }

    fn update(&self, path: &str, partial: Value) -> UvvResult<()> {
        debug!(path = %path, "update");
        let mut root = self.lock(path)?;
        tree::update(&mut root, path, partial)
    }

    fn remove(&self, path: &str) -> UvvResult<()> {
        debug!(path = %path, "remove");
        let mut root = self.lock(path)?;
        tree::remove(&mut root, path);
        Ok(())
    }
}
