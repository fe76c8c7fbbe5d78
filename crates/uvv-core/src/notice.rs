//! Login notice: machines that need attention plus recent changes.

use chrono::{DateTime, Duration, Utc};

use uvv_contracts::{
    change::{ChangeEvent, ChangeType},
    machine::StoredMachine,
    status::ComplianceStatus,
};

use crate::{relevance::select_relevant_changes_within, status::record_status};

/// A yellow or red machine, with the status transition that put it there
/// if that transition is among the relevant changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionItem {
    pub machine: StoredMachine,
    pub status: ComplianceStatus,
    pub recent_transition: Option<ChangeEvent>,
}

/// What to show a user right after login.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginNotice {
    /// Red machines first, then yellow, each group in load order.
    pub attention: Vec<AttentionItem>,
    /// Relevant change events, newest first.
    pub changes: Vec<ChangeEvent>,
}

impl LoginNotice {
    /// True when there is nothing worth showing.
    pub fn is_empty(&self) -> bool {
        self.attention.is_empty() && self.changes.is_empty()
    }
}

/// Build the login notice from a loaded snapshot and change log.
pub fn build_login_notice(
    machines: &[StoredMachine],
    events: &[ChangeEvent],
    last_login: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lookback: Duration,
) -> LoginNotice {
    let today = now.date_naive();
    let changes = select_relevant_changes_within(events, last_login, now, lookback);

    let mut attention: Vec<AttentionItem> = machines
        .iter()
        .filter_map(|machine| {
            let status = record_status(&machine.record, today);
            if !status.needs_attention() {
                return None;
            }
            let recent_transition = changes
                .iter()
                .find(|event| {
                    event.change_type == ChangeType::StatusChanged && concerns(event, machine)
                })
                .map(|event| (*event).clone());
            Some(AttentionItem {
                machine: machine.clone(),
                status,
                recent_transition,
            })
        })
        .collect();

    attention.sort_by_key(|item| item.status.severity_rank());

    LoginNotice {
        attention,
        changes: changes.into_iter().cloned().collect(),
    }
}

fn concerns(event: &ChangeEvent, machine: &StoredMachine) -> bool {
    event.machine_id == machine.id
        || event.equipment_number() == Some(machine.record.equipment_number.as_str())
}
