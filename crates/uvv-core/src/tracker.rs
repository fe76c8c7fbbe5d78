//! The session tracker.
//!
//! One `Tracker` per signed-in user. It owns the handles to the document
//! store and the change log plus the session's loaded snapshot (machines and
//! both option lists), and exposes one method per user action.
//!
//! Record writes and change-log appends are separate store calls. A record
//! write that fails aborts the action with `UvvError::Store`; a change-log
//! append that fails is logged and otherwise ignored, so the record mutation
//! always stands once it has been written.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use uvv_contracts::{
    change::{ChangeEvent, ChangeType},
    error::{UvvError, UvvResult},
    machine::{MachineDraft, MachineRecord, StoredMachine},
    options::OptionField,
    status::ComplianceStatus,
};

use crate::{
    filter::MachineFilter,
    notice::{build_login_notice, LoginNotice},
    paths, recording,
    relevance::DEFAULT_LOOKBACK_HOURS,
    status::record_status,
    traits::{ChangeWriter, DocumentStore},
    validate,
};

/// Optional record fields. An update clears each one the new record omits.
const CLEARABLE_FIELDS: [&str; 6] = [
    "manufacturer",
    "model",
    "service_type",
    "operating_hours",
    "inspection_due",
    "comment",
];

/// Result of a successful `Tracker::save`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Store key of the saved machine.
    pub id: String,
    /// The event type the save produced (whether or not it was recorded).
    pub change: ChangeType,
    /// Derived status of the saved record.
    pub status: ComplianceStatus,
}

/// Session-scoped state and actions for one user.
pub struct Tracker {
    store: Box<dyn DocumentStore>,
    changes: Box<dyn ChangeWriter>,
    user: String,
    lookback: Duration,
    machines: Vec<StoredMachine>,
    manufacturers: Vec<String>,
    departments: Vec<String>,
}

impl Tracker {
    /// Create a tracker with an empty snapshot. Call `load()` before use.
    pub fn new(
        store: Box<dyn DocumentStore>,
        changes: Box<dyn ChangeWriter>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            store,
            changes,
            user: user.into(),
            lookback: Duration::hours(DEFAULT_LOOKBACK_HOURS),
            machines: Vec::new(),
            manufacturers: Vec::new(),
            departments: Vec::new(),
        }
    }

    /// Override the trailing window used by `login_notice`.
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Trailing window of the recent-changes notice.
    pub fn lookback(&self) -> Duration {
        self.lookback
    }

    pub fn machines(&self) -> &[StoredMachine] {
        &self.machines
    }

    pub fn machine(&self, id: &str) -> Option<&StoredMachine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn options(&self, field: OptionField) -> &[String] {
        match field {
            OptionField::Manufacturer => &self.manufacturers,
            OptionField::Department => &self.departments,
        }
    }

    // ── Login ────────────────────────────────────────────────────────────────

    /// The user's stored last-login time, without modifying it.
    ///
    /// A stored value that is not an RFC 3339 timestamp reads as `None`.
    pub fn last_login(&self) -> UvvResult<Option<DateTime<Utc>>> {
        let path = paths::last_login(&self.user);
        let Some(value) = self.store.get(&path)? else {
            return Ok(None);
        };
        match serde_json::from_value::<DateTime<Utc>>(value) {
            Ok(at) => Ok(Some(at)),
            Err(e) => {
                warn!(path = %path, error = %e, "ignoring malformed last-login timestamp");
                Ok(None)
            }
        }
    }

    /// Record a successful login at `now` and return the previous one.
    ///
    /// The previous value is read before it is overwritten. A failure to
    /// write the new stamp is logged and does not fail the login.
    pub fn sign_in(&self, now: DateTime<Utc>) -> UvvResult<Option<DateTime<Utc>>> {
        let previous = self.last_login()?;

        let path = paths::last_login(&self.user);
        let stamp = Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true));
        if let Err(e) = self.store.set(&path, stamp) {
            warn!(user = %self.user, error = %e, "failed to store login timestamp");
        }

        info!(
            user = %self.user,
            previous = ?previous,
            "user signed in"
        );
        Ok(previous)
    }

    /// Build the login notice from the loaded snapshot and the change log.
    pub fn login_notice(
        &self,
        last_login: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> UvvResult<LoginNotice> {
        let events = self.load_changes()?;
        let notice = build_login_notice(&self.machines, &events, last_login, now, self.lookback);
        debug!(
            user = %self.user,
            attention = notice.attention.len(),
            changes = notice.changes.len(),
            "login notice built"
        );
        Ok(notice)
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Load both option lists and all machines into the snapshot.
    ///
    /// On error the snapshot is left as it was.
    pub fn load(&mut self) -> UvvResult<()> {
        let manufacturers = self.fetch_options(OptionField::Manufacturer)?;
        let departments = self.fetch_options(OptionField::Department)?;
        let machines = self.fetch_machines()?;

        self.manufacturers = manufacturers;
        self.departments = departments;
        self.machines = machines;
        Ok(())
    }

    /// Read the whole change log in key order.
    ///
    /// Entries that do not decode as a `ChangeEvent` (unknown type, missing
    /// fields) are skipped with a warning.
    pub fn load_changes(&self) -> UvvResult<Vec<ChangeEvent>> {
        let Some(value) = self.store.get(paths::CHANGES)? else {
            return Ok(Vec::new());
        };
        let entries = into_object(value, paths::CHANGES)?;

        let mut events = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            match serde_json::from_value::<ChangeEvent>(entry) {
                Ok(event) => events.push(event),
                Err(e) => warn!(key = %key, error = %e, "skipping malformed change event"),
            }
        }
        Ok(events)
    }

    /// Read an option list. A list the store does not have yet is seeded
    /// with `OptionField::seed_values`; failing to write the seed is logged.
    fn fetch_options(&self, field: OptionField) -> UvvResult<Vec<String>> {
        let path = paths::options(field);
        match self.store.get(&path)? {
            None => {
                let seed: Vec<String> = field.seed_values().iter().map(|v| v.to_string()).collect();
                if let Err(e) = self.store.set(&path, Value::from(seed.clone())) {
                    warn!(field = %field, error = %e, "failed to store seeded option list");
                }
                Ok(seed)
            }
            Some(value) => serde_json::from_value(value).map_err(|e| UvvError::Decode {
                path,
                reason: e.to_string(),
            }),
        }
    }

    fn fetch_machines(&self) -> UvvResult<Vec<StoredMachine>> {
        let Some(value) = self.store.get(paths::MACHINES)? else {
            return Ok(Vec::new());
        };
        let entries = into_object(value, paths::MACHINES)?;

        let mut machines = Vec::with_capacity(entries.len());
        for (id, doc) in entries {
            match serde_json::from_value::<MachineRecord>(doc) {
                Ok(mut record) => {
                    if record.migrate_legacy_fields() {
                        debug!(id = %id, "manufacturer taken from legacy field");
                    }
                    machines.push(StoredMachine { id, record });
                }
                Err(e) => warn!(id = %id, error = %e, "skipping malformed machine record"),
            }
        }
        Ok(machines)
    }

    fn reload_machines(&mut self) {
        match self.fetch_machines() {
            Ok(machines) => self.machines = machines,
            Err(e) => warn!(error = %e, "failed to reload machines; keeping previous snapshot"),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Create (no `edit_target`) or update (`edit_target` = store key) a
    /// machine.
    ///
    /// # Pipeline
    ///
    /// 1. Normalize the equipment number (trim, uppercase; empty is an error)
    /// 2. Create: reject a number that already exists (case-insensitive).
    ///    Update: the target must be in the snapshot; its equipment number
    ///    is kept
    /// 3. Validate the draft into a record stamped with (user, `now`)
    /// 4. Write the record: `set` on create, `update` on edit
    /// 5. Append one change event (best effort, see `recording`)
    /// 6. Reload the machine list
    pub fn save(
        &mut self,
        draft: &MachineDraft,
        edit_target: Option<&str>,
        now: DateTime<Utc>,
    ) -> UvvResult<SaveOutcome> {
        let equipment_number = validate::normalize_equipment_number(&draft.equipment_number)?;
        let today = now.date_naive();

        let outcome = match edit_target {
            None => {
                // Distinct numbers can share a store key once sanitized.
                let id = paths::sanitize_key(&equipment_number);
                if self.machine(&id).is_some()
                    || self
                        .machines
                        .iter()
                        .any(|m| m.record.equipment_number.to_uppercase() == equipment_number)
                {
                    return Err(UvvError::DuplicateEquipmentNumber { equipment_number });
                }

                let record = validate::build_record(draft, equipment_number, &self.user, now)?;
                self.store
                    .set(&paths::machine(&id), recording::snapshot(&record)?)?;

                info!(id = %id, user = %self.user, "machine created");
                self.record_change(recording::created_event(&id, &record, &self.user, now));

                SaveOutcome {
                    status: record_status(&record, today),
                    id,
                    change: ChangeType::Created,
                }
            }

            Some(id) => {
                let old = self
                    .machine(id)
                    .ok_or_else(|| UvvError::UnknownMachine { id: id.to_string() })?
                    .record
                    .clone();

                let record =
                    validate::build_record(draft, old.equipment_number.clone(), &self.user, now)?;
                self.store
                    .update(&paths::machine(id), clearing_patch(&record)?)?;

                let event = recording::update_event(id, &old, &record, &self.user, now);
                let change = match &event {
                    Ok(e) => e.change_type,
                    Err(_) => ChangeType::Updated,
                };
                info!(id = %id, user = %self.user, change = change.as_str(), "machine updated");
                self.record_change(event);

                SaveOutcome {
                    id: id.to_string(),
                    change,
                    status: record_status(&record, today),
                }
            }
        };

        self.reload_machines();
        Ok(outcome)
    }

    /// Delete a machine and record a `deleted` event with its last state.
    ///
    /// The removal is issued even if `id` is not in the snapshot; the event
    /// is only recorded when there is a snapshot to carry.
    pub fn delete(&mut self, id: &str, now: DateTime<Utc>) -> UvvResult<()> {
        let snapshot = self.machine(id).map(|m| m.record.clone());

        self.store.remove(&paths::machine(id))?;
        info!(id = %id, user = %self.user, "machine deleted");

        match snapshot {
            Some(record) => {
                self.record_change(recording::deleted_event(id, &record, &self.user, now))
            }
            None => warn!(id = %id, "deleted machine was not loaded; no change event recorded"),
        }

        self.reload_machines();
        Ok(())
    }

    /// Add a value to an option list.
    ///
    /// Returns `Ok(false)` without writing when the trimmed value is empty or
    /// already present. Otherwise the whole list is overwritten in the store.
    pub fn add_option(&mut self, field: OptionField, value: &str) -> UvvResult<bool> {
        let value = value.trim();
        if value.is_empty() || self.options(field).iter().any(|v| v == value) {
            return Ok(false);
        }

        let mut next = self.options(field).to_vec();
        next.push(value.to_string());
        self.store
            .set(&paths::options(field), Value::from(next.clone()))?;

        info!(field = %field, value = %value, "option added");
        match field {
            OptionField::Manufacturer => self.manufacturers = next,
            OptionField::Department => self.departments = next,
        }
        Ok(true)
    }

    /// Machines in the snapshot that pass `filter`, in load order.
    pub fn filter(&self, filter: &MachineFilter, today: NaiveDate) -> Vec<&StoredMachine> {
        filter.apply(&self.machines, today)
    }

    fn record_change(&self, event: UvvResult<ChangeEvent>) {
        let result = event.and_then(|e| self.changes.append(&e));
        if let Err(e) = result {
            warn!(user = %self.user, error = %e, "change event not recorded");
        }
    }
}

/// Merge patch for an update: the record's fields, plus `null` for every
/// optional field the record leaves empty so stale values are removed.
fn clearing_patch(record: &MachineRecord) -> UvvResult<Value> {
    let mut patch = recording::snapshot(record)?;
    if let Some(fields) = patch.as_object_mut() {
        for name in CLEARABLE_FIELDS {
            fields.entry(name).or_insert(Value::Null);
        }
    }
    Ok(patch)
}

fn into_object(value: Value, path: &str) -> UvvResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(UvvError::Decode {
            path: path.to_string(),
            reason: format!("expected an object, found {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
