//! # uvv-contracts
//!
//! Shared types for the UVV compliance tracker.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, small accessors, and error types.

pub mod change;
pub mod error;
pub mod machine;
pub mod options;
pub mod status;
