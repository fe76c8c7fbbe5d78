//! Store path layout.
//!
//! ```text
//! machines/{id}            MachineRecord
//! options/hersteller       [String]
//! options/abteilung        [String]
//! changes/{millis}_{user}  ChangeEvent
//! userLastLogin/{user}     RFC 3339 timestamp
//! ```

use uvv_contracts::{change::ChangeEvent, options::OptionField};

pub const MACHINES: &str = "machines";
pub const CHANGES: &str = "changes";
pub const LAST_LOGIN: &str = "userLastLogin";

/// Make `raw` safe to use as a single path segment.
///
/// `. # $ [ ]` are not allowed in store keys and `/` would split the
/// segment; each becomes `_`.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '.' | '#' | '$' | '[' | ']' | '/' => '_',
            other => other,
        })
        .collect()
}

pub fn machine(id: &str) -> String {
    format!("{}/{}", MACHINES, id)
}

pub fn options(field: OptionField) -> String {
    format!("options/{}", field.storage_name())
}

pub fn change(event: &ChangeEvent) -> String {
    format!("{}/{}", CHANGES, sanitize_key(&event.log_key()))
}

pub fn last_login(user: &str) -> String {
    format!("{}/{}", LAST_LOGIN, sanitize_key(user))
}
