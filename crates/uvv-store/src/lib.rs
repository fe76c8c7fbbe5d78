//! # uvv-store
//!
//! `DocumentStore` implementations for the UVV compliance tracker.
//!
//! - [`InMemoryStore`]: the document tree in a `Mutex`, for tests and
//!   single-process use.
//! - [`JsonFileStore`]: the same tree persisted to one JSON file after each
//!   write. This is what the `uvv` CLI uses.
//!
//! Both follow the same path semantics: `set` overwrites (and `null`
//! removes), `update` shallow-merges an object, `remove` of a missing path
//! succeeds, and reading a collection path returns an object keyed by child.

pub mod file;
pub mod memory;
mod tree;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
