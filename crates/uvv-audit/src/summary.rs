//! One-line, human-readable descriptions of change events.

use uvv_contracts::change::{ChangeEvent, ChangeType};

/// Describe `event` in one line, e.g.
///
/// ```text
/// 2024-06-01 12:00 UTC  FG-100  status green -> yellow  by Felix (you)
/// ```
///
/// `(you)` is appended when the event was recorded by `current_user`.
pub fn describe_change(event: &ChangeEvent, current_user: &str) -> String {
    let subject = event.equipment_number().unwrap_or(&event.machine_id);

    let what = match event.change_type {
        ChangeType::Created => "created".to_string(),
        ChangeType::Updated => "updated".to_string(),
        ChangeType::Deleted => "deleted".to_string(),
        ChangeType::StatusChanged => match (event.previous_status(), event.new_status()) {
            (Some(old), Some(new)) => format!("status {} -> {}", old, new),
            _ => "status changed".to_string(),
        },
    };

    let mut line = format!(
        "{}  {}  {}  by {}",
        event.timestamp.format("%Y-%m-%d %H:%M UTC"),
        subject,
        what,
        event.user
    );
    if event.is_authored_by(current_user) {
        line.push_str(" (you)");
    }
    line
}
