//! Client-side filtering of the loaded machine list.
//!
//! Text criteria are case-insensitive substring matches. A record whose
//! optional field is absent passes that field's criterion; department is
//! required on every record and is always checked. Blank criteria are
//! ignored.

use chrono::NaiveDate;

use uvv_contracts::{
    machine::{MachineRecord, StoredMachine},
    status::ComplianceStatus,
};

use crate::status::record_status;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineFilter {
    pub equipment_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub department: Option<String>,
    pub service_type: Option<String>,
    /// Matched against the textual form of the hours, e.g. `"12"` matches
    /// `1200` and `312.5`.
    pub operating_hours: Option<String>,
    pub status: Option<ComplianceStatus>,
    pub comment: Option<String>,
}

impl MachineFilter {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.equipment_number,
            &self.manufacturer,
            &self.model,
            &self.department,
            &self.service_type,
            &self.operating_hours,
            &self.comment,
        ]
        .iter()
        .all(|c| criterion(c).is_none())
            && self.status.is_none()
    }

    pub fn matches(&self, record: &MachineRecord, today: NaiveDate) -> bool {
        if let Some(needle) = criterion(&self.equipment_number) {
            if !contains_ci(&record.equipment_number, needle) {
                return false;
            }
        }
        if let Some(needle) = criterion(&self.department) {
            if !contains_ci(&record.department, needle) {
                return false;
            }
        }

        let optional_fields = [
            (&self.manufacturer, record.manufacturer.as_deref()),
            (&self.model, record.model.as_deref()),
            (&self.service_type, record.service_type.as_deref()),
            (&self.comment, record.comment.as_deref()),
        ];
        for (wanted, value) in optional_fields {
            if let (Some(needle), Some(value)) = (criterion(wanted), value) {
                if !contains_ci(value, needle) {
                    return false;
                }
            }
        }

        if let (Some(needle), Some(hours)) = (criterion(&self.operating_hours), record.operating_hours)
        {
            if !hours.to_string().contains(needle) {
                return false;
            }
        }

        match self.status {
            Some(wanted) => record_status(record, today) == wanted,
            None => true,
        }
    }

    /// Apply the filter to a loaded machine list, preserving order.
    pub fn apply<'a>(&self, machines: &'a [StoredMachine], today: NaiveDate) -> Vec<&'a StoredMachine> {
        machines
            .iter()
            .filter(|m| self.matches(&m.record, today))
            .collect()
    }
}

fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
