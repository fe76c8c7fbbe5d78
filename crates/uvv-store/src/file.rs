//! File-backed implementation of `DocumentStore`.
//!
//! The whole tree is kept in memory and rewritten to disk as pretty-printed
//! JSON after every mutation. A mutation is applied to a copy of the tree
//! first; the in-memory tree only changes once the file has been written, so
//! a failed write leaves both untouched.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};
use tracing::{debug, info};

use uvv_contracts::error::{UvvError, UvvResult};
use uvv_core::traits::DocumentStore;

use crate::tree;

/// A document store persisted to a single JSON file.
pub struct JsonFileStore {
    file: PathBuf,
    state: Mutex<Value>,
}

impl JsonFileStore {
    /// Open the store at `file`. A missing file opens as an empty store and
    /// is created on the first write.
    pub fn open(file: impl Into<PathBuf>) -> UvvResult<Self> {
        let file = file.into();
        let root = if file.exists() {
            let contents = fs::read_to_string(&file).map_err(|e| io_error(&file, e))?;
            serde_json::from_str(&contents).map_err(|e| UvvError::Decode {
                path: file.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            Value::Object(Map::new())
        };

        info!(file = %file.display(), "document store opened");
        Ok(Self {
            file,
            state: Mutex::new(root),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    fn mutate(&self, path: &str, apply: impl FnOnce(&mut Value) -> UvvResult<()>) -> UvvResult<()> {
        let mut state = self.state.lock().map_err(|e| UvvError::Store {
            path: path.to_string(),
            reason: format!("store lock poisoned: {}", e),
        })?;

        let mut next = state.clone();
        apply(&mut next)?;
        self.persist(&next)?;
        *state = next;

        debug!(path = %path, file = %self.file.display(), "document store written");
        Ok(())
    }

    fn persist(&self, root: &Value) -> UvvResult<()> {
        let bytes = serde_json::to_vec_pretty(root).map_err(|e| UvvError::Serialization {
            reason: e.to_string(),
        })?;

        if let Some(dir) = self.file.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }

        // Staging file first, then rename over the target.
        let staging = self.file.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|e| io_error(&staging, e))?;
        fs::rename(&staging, &self.file).map_err(|e| io_error(&self.file, e))
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, path: &str) -> UvvResult<Option<Value>> {
        let state = self.state.lock().map_err(|e| UvvError::Store {
            path: path.to_string(),
            reason: format!("store lock poisoned: {}", e),
        })?;
        Ok(tree::get(&state, path).filter(|v| !v.is_null()).cloned())
    }

    fn set(&self, path: &str, value: Value) -> UvvResult<()> {
        self.mutate(path, |root| {
            tree::set(root, path, value);
            Ok(())
        })
    }

    fn update(&self, path: &str, partial: Value) -> UvvResult<()> {
        self.mutate(path, |root| tree::update(root, path, partial))
    }

    fn remove(&self, path: &str) -> UvvResult<()> {
        self.mutate(path, |root| {
            tree::remove(root, path);
            Ok(())
        })
    }
}

fn io_error(file: &Path, e: std::io::Error) -> UvvError {
    UvvError::Store {
        path: file.display().to_string(),
        reason: e.to_string(),
    }
}
