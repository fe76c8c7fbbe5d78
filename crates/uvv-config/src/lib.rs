//! # uvv-config
//!
//! TOML configuration for the UVV compliance tracker: the fixed credential
//! table, the location of the data file, and the look-back window of the
//! recent-changes notice.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use uvv_config::TrackerConfig;
//!
//! let config = TrackerConfig::from_file(Path::new("config/uvv.toml"))?;
//! config.authenticate("Felix", "secret")?;
//! ```

pub mod config;

pub use config::{TrackerConfig, UserEntry, DEFAULT_DATA_FILE, DEFAULT_LOOKBACK_HOURS};

// ── Tests ─────────────────────────────────────────────────────────────────────
