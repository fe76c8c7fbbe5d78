//! # uvv-audit
//!
//! Append-only change log for the UVV compliance tracker.
//!
//! ## Overview
//!
//! Every create, update and delete the tracker performs is described by one
//! `ChangeEvent`. This crate provides the sinks those events are written to
//! and a one-line rendering used when listing them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uvv_audit::StoreChangeWriter;
//! use uvv_store::JsonFileStore;
//!
//! let store = Arc::new(JsonFileStore::open("uvv-data.json")?);
//! let writer = StoreChangeWriter::new(Box::new(store.clone()));
//! // Pass `writer` to `uvv_core::Tracker::new(...)`.
//! ```

pub mod summary;
pub mod writer;

pub use summary::describe_change;
pub use writer::{InMemoryChangeWriter, StoreChangeWriter};

/// Upper bound on `-N` suffixes tried when a log key is already taken.
pub(crate) const MAX_KEY_ATTEMPTS: usize = 1000;

// ── Tests ─────────────────────────────────────────────────────────────────────
