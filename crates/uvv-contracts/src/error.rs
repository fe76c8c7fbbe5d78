//! Error types for the UVV tracker.
//!
//! Every fallible operation returns `UvvResult<T>`. Status derivation is
//! never fallible; a malformed inspection date resolves to red instead.

use thiserror::Error;

/// The unified error type for the UVV tracker.
#[derive(Debug, Error)]
pub enum UvvError {
    /// The equipment number was empty after trimming.
    #[error("equipment number is required")]
    MissingEquipmentNumber,

    /// A create was attempted with an equipment number that already exists.
    #[error("equipment number '{equipment_number}' already exists")]
    DuplicateEquipmentNumber { equipment_number: String },

    /// A record field failed validation before any write was attempted.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The edit or delete target is not part of the loaded snapshot.
    #[error("machine '{id}' not found")]
    UnknownMachine { id: String },

    /// The document store rejected or failed a read or write.
    #[error("store operation on '{path}' failed: {reason}")]
    Store { path: String, reason: String },

    /// A document read from the store did not have the expected shape.
    #[error("malformed document at '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// A record or event could not be converted to a JSON document.
    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The user name / password pair is not in the credential table.
    #[error("invalid credentials for user '{user}'")]
    InvalidCredentials { user: String },
}

/// Convenience alias used throughout the UVV crates.
pub type UvvResult<T> = Result<T, UvvError>;
