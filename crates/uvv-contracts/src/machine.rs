//! Machine record types.
//!
//! A `MachineRecord` is the document stored under `machines/{id}`. The id is
//! the sanitized equipment number; the record itself keeps the equipment
//! number verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who last saved a record, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastChange {
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

/// One machine under periodic inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    /// Uppercased equipment number. Unique across all records.
    pub equipment_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Owning department. Always present.
    pub department: String,

    /// Kind of after-sales service contract, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<f64>,

    /// Month of the last inspection, as `"YYYY-MM"` or `"MM/YYYY"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_due: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change: Option<LastChange>,

    /// Manufacturer as written by older clients. Read-only; never persisted.
    #[serde(default, rename = "typ", skip_serializing)]
    pub legacy_type: Option<String>,
}

impl MachineRecord {
    /// Fold the legacy `typ` field into `manufacturer` when the latter is
    /// missing. Returns true if the record changed.
    pub fn migrate_legacy_fields(&mut self) -> bool {
        match self.legacy_type.take() {
            Some(typ) if self.manufacturer.is_none() => {
                self.manufacturer = Some(typ);
                true
            }
            _ => false,
        }
    }
}

/// A machine record paired with the store key it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMachine {
    pub id: String,
    pub record: MachineRecord,
}

/// User-entered values for a create or update, before validation.
///
/// Blank optional strings are treated as absent when the draft is turned
/// into a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineDraft {
    pub equipment_number: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub department: String,
    pub service_type: Option<String>,
    pub operating_hours: Option<f64>,
    pub inspection_due: Option<String>,
    pub comment: Option<String>,
}

impl MachineDraft {
    /// Start a draft from an existing record, e.g. to edit a few fields.
    pub fn from_record(record: &MachineRecord) -> Self {
        Self {
            equipment_number: record.equipment_number.clone(),
            manufacturer: record.manufacturer.clone(),
            model: record.model.clone(),
            department: record.department.clone(),
            service_type: record.service_type.clone(),
            operating_hours: record.operating_hours,
            inspection_due: record.inspection_due.clone(),
            comment: record.comment.clone(),
        }
    }
}
