//! Option lists offered when editing a record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which option list a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionField {
    Manufacturer,
    Department,
}

impl OptionField {
    /// Name of the list under `options/` in the document store.
    pub fn storage_name(self) -> &'static str {
        match self {
            OptionField::Manufacturer => "hersteller",
            OptionField::Department => "abteilung",
        }
    }

    /// Values a list starts with when the store has none yet.
    pub fn seed_values(self) -> &'static [&'static str] {
        match self {
            OptionField::Manufacturer => &["Magaziner"],
            OptionField::Department => &["Lager"],
        }
    }
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionField::Manufacturer => f.write_str("manufacturer"),
            OptionField::Department => f.write_str("department"),
        }
    }
}
