//! Collaborator traits for the UVV tracker.
//!
//! - `DocumentStore` is the external, path-addressed JSON store every record,
//!   option list, login stamp and change event lives in.
//! - `ChangeWriter` appends to the shared change log.
//!
//! The `Tracker` drives both. Neither trait is consulted by the status engine
//! or the relevance filter, which only see already-loaded data.

use std::sync::Arc;

use serde_json::Value;

use uvv_contracts::{change::ChangeEvent, error::UvvResult};

/// A key-value document store reachable by slash-separated path
/// (e.g. `machines/FG-100`).
///
/// Every call may fail with `UvvError::Store`. Implementations need not be
/// transactional across calls.
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`. `None` if nothing is stored there.
    ///
    /// Reading a collection path (e.g. `machines`) returns an object keyed by
    /// child id.
    fn get(&self, path: &str) -> UvvResult<Option<Value>>;

    /// Overwrite the document at `path`. Writing `null` removes it.
    fn set(&self, path: &str, value: Value) -> UvvResult<()>;

    /// Merge the keys of `partial` (a JSON object) into the document at
    /// `path`. A `null` value removes that key.
    fn update(&self, path: &str, partial: Value) -> UvvResult<()>;

    /// Delete the document at `path`. Removing a missing path succeeds.
    fn remove(&self, path: &str) -> UvvResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn get(&self, path: &str) -> UvvResult<Option<Value>> {
        (**self).get(path)
    }

    fn set(&self, path: &str, value: Value) -> UvvResult<()> {
        (**self).set(path, value)
    }

    fn update(&self, path: &str, partial: Value) -> UvvResult<()> {
        (**self).update(path, partial)
    }

    fn remove(&self, path: &str) -> UvvResult<()> {
        (**self).remove(path)
    }
}

/// Sink for the append-only change log.
///
/// Implementations must never modify or delete an event once written. The
/// tracker treats a failed append as non-fatal: it is logged and the record
/// mutation that triggered it stands.
pub trait ChangeWriter: Send + Sync {
    /// Append one event to the change log.
    fn append(&self, event: &ChangeEvent) -> UvvResult<()>;
}
