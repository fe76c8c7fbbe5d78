//! Change-log event types.
//!
//! The change log lives under `changes/{key}` and is append-only: events
//! are written once by whichever session made the change and never touched
//! again. Snapshots are plain JSON so that partial snapshots (a bare
//! `{"status": ...}`) and full records share one field type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ComplianceStatus;

/// What kind of mutation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    Updated,
    Deleted,
    /// An update that moved the derived compliance status.
    StatusChanged,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Created => "created",
            ChangeType::Updated => "updated",
            ChangeType::Deleted => "deleted",
            ChangeType::StatusChanged => "status_changed",
        }
    }
}

/// One entry in the shared change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub change_type: ChangeType,

    /// Store key of the affected machine.
    pub machine_id: String,

    /// Machine data after the change (before it, for `deleted`).
    pub machine_data: serde_json::Value,

    /// Prior state. `{"status": ...}` for `status_changed`, the full old
    /// record for `updated`, absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_data: Option<serde_json::Value>,

    /// The user whose session recorded the change.
    pub user: String,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Log key: creation time in epoch milliseconds joined with the user.
    pub fn log_key(&self) -> String {
        format!("{}_{}", self.timestamp.timestamp_millis(), self.user)
    }

    pub fn is_authored_by(&self, user: &str) -> bool {
        self.user == user
    }

    /// Equipment number recorded in the post-change snapshot, if any.
    pub fn equipment_number(&self) -> Option<&str> {
        self.machine_data.get("equipment_number")?.as_str()
    }

    /// Status carried by the post-change snapshot (`status_changed` only).
    pub fn new_status(&self) -> Option<ComplianceStatus> {
        status_field(&self.machine_data)
    }

    /// Status carried by the prior-state snapshot (`status_changed` only).
    pub fn previous_status(&self) -> Option<ComplianceStatus> {
        status_field(self.old_data.as_ref()?)
    }
}

fn status_field(snapshot: &serde_json::Value) -> Option<ComplianceStatus> {
    serde_json::from_value(snapshot.get("status")?.clone()).ok()
}
