//! Draft validation. Runs before any write reaches the store.

use chrono::{DateTime, Utc};

use uvv_contracts::{
    error::{UvvError, UvvResult},
    machine::{LastChange, MachineDraft, MachineRecord},
};

/// Trim and uppercase an equipment number. Empty is an error.
pub fn normalize_equipment_number(raw: &str) -> UvvResult<String> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(UvvError::MissingEquipmentNumber);
    }
    Ok(normalized)
}

/// Turn a draft into the record that will be written.
///
/// `equipment_number` must already be normalized. Blank optional strings
/// become absent; the last-change stamp is set to (`user`, `now`).
pub fn build_record(
    draft: &MachineDraft,
    equipment_number: String,
    user: &str,
    now: DateTime<Utc>,
) -> UvvResult<MachineRecord> {
    let department = draft.department.trim();
    if department.is_empty() {
        return Err(UvvError::Validation {
            reason: "department is required".to_string(),
        });
    }

    if let Some(hours) = draft.operating_hours {
        if !hours.is_finite() || hours < 0.0 {
            return Err(UvvError::Validation {
                reason: format!("operating hours must be a non-negative number, got {}", hours),
            });
        }
    }

    Ok(MachineRecord {
        equipment_number,
        manufacturer: non_blank(&draft.manufacturer),
        model: non_blank(&draft.model),
        department: department.to_string(),
        service_type: non_blank(&draft.service_type),
        operating_hours: draft.operating_hours,
        inspection_due: non_blank(&draft.inspection_due),
        comment: non_blank(&draft.comment),
        last_change: Some(LastChange {
            user: user.to_string(),
            timestamp: now,
        }),
        legacy_type: None,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
