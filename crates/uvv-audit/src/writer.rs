//! `ChangeWriter` implementations.
//!
//! `StoreChangeWriter` appends to `changes/{millis}_{user}` in a
//! `DocumentStore`. It never overwrites an existing entry: if the key is
//! taken (two events from one user in the same millisecond) a `-N` suffix is
//! appended until a free key is found.
//!
//! `InMemoryChangeWriter` keeps events in a `Vec` and is used where no store
//! is wanted, e.g. dry runs and tests.

use std::sync::{Arc, Mutex};

use tracing::debug;

use uvv_contracts::{
    change::ChangeEvent,
    error::{UvvError, UvvResult},
};
use uvv_core::{
    paths,
    traits::{ChangeWriter, DocumentStore},
};

use crate::MAX_KEY_ATTEMPTS;

/// Appends change events to the shared log in a document store.
pub struct StoreChangeWriter {
    store: Box<dyn DocumentStore>,
}

impl StoreChangeWriter {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// First free log path for `event`.
    fn free_path(&self, event: &ChangeEvent) -> UvvResult<String> {
        let base = paths::change(event);
        if self.store.get(&base)?.is_none() {
            return Ok(base);
        }
        for n in 1..MAX_KEY_ATTEMPTS {
            let candidate = format!("{}-{}", base, n);
            if self.store.get(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(UvvError::Store {
            path: base,
            reason: format!("no free change-log key after {} attempts", MAX_KEY_ATTEMPTS),
        })
    }
}

impl ChangeWriter for StoreChangeWriter {
    fn append(&self, event: &ChangeEvent) -> UvvResult<()> {
        let path = self.free_path(event)?;
        let value = serde_json::to_value(event).map_err(|e| UvvError::Serialization {
            reason: format!("change event for '{}': {}", event.machine_id, e),
        })?;
        self.store.set(&path, value)?;

        debug!(
            path = %path,
            change = event.change_type.as_str(),
            machine_id = %event.machine_id,
            "change event appended"
        );
        Ok(())
    }
}

/// An append-only change log held in memory.
///
/// Clones share the same underlying log.
#[derive(Clone, Default)]
pub struct InMemoryChangeWriter {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

impl InMemoryChangeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events appended so far, in append order.
    pub fn events(&self) -> Vec<ChangeEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ChangeWriter for InMemoryChangeWriter {
    fn append(&self, event: &ChangeEvent) -> UvvResult<()> {
        let mut events = self.events.lock().map_err(|e| UvvError::Store {
            path: paths::CHANGES.to_string(),
            reason: format!("change log lock poisoned: {}", e),
        })?;
        events.push(event.clone());
        Ok(())
    }
}
