//! Event-recording policy: which single change event a mutation produces.
//!
//! | mutation                  | event            | machine_data          | old_data        |
//! |---------------------------|------------------|-----------------------|-----------------|
//! | create                    | `created`        | new record            | -               |
//! | update, status unchanged  | `updated`        | new record            | old record      |
//! | update, status changed    | `status_changed` | new record + `status` | `{status: old}` |
//! | delete                    | `deleted`        | record before delete  | -               |
//!
//! Statuses are derived for the UTC calendar date of `now`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use uvv_contracts::{
    change::{ChangeEvent, ChangeType},
    error::{UvvError, UvvResult},
    machine::MachineRecord,
};

use crate::status::record_status;

/// Event for a newly created record.
pub fn created_event(
    id: &str,
    record: &MachineRecord,
    user: &str,
    now: DateTime<Utc>,
) -> UvvResult<ChangeEvent> {
    Ok(event(ChangeType::Created, id, snapshot(record)?, None, user, now))
}

/// Event for an update of `old` to `new`.
///
/// Produces `status_changed` whenever the derived status differs, whatever
/// the direction; otherwise `updated`.
pub fn update_event(
    id: &str,
    old: &MachineRecord,
    new: &MachineRecord,
    user: &str,
    now: DateTime<Utc>,
) -> UvvResult<ChangeEvent> {
    let today = now.date_naive();
    let old_status = record_status(old, today);
    let new_status = record_status(new, today);

    if old_status != new_status {
        let mut data = snapshot(new)?;
        if let Some(fields) = data.as_object_mut() {
            fields.insert("status".to_string(), json!(new_status));
        }
        let prior = json!({ "status": old_status });
        Ok(event(ChangeType::StatusChanged, id, data, Some(prior), user, now))
    } else {
        Ok(event(
            ChangeType::Updated,
            id,
            snapshot(new)?,
            Some(snapshot(old)?),
            user,
            now,
        ))
    }
}

/// Event for a deleted record, carrying its last known state.
pub fn deleted_event(
    id: &str,
    record: &MachineRecord,
    user: &str,
    now: DateTime<Utc>,
) -> UvvResult<ChangeEvent> {
    Ok(event(ChangeType::Deleted, id, snapshot(record)?, None, user, now))
}

/// Serialize a record to the JSON form stored in snapshots.
pub fn snapshot(record: &MachineRecord) -> UvvResult<Value> {
    serde_json::to_value(record).map_err(|e| UvvError::Serialization {
        reason: format!("machine '{}': {}", record.equipment_number, e),
    })
}

fn event(
    change_type: ChangeType,
    id: &str,
    machine_data: Value,
    old_data: Option<Value>,
    user: &str,
    now: DateTime<Utc>,
) -> ChangeEvent {
    ChangeEvent {
        change_type,
        machine_id: id.to_string(),
        machine_data,
        old_data,
        user: user.to_string(),
        timestamp: now,
    }
}
