//! Change relevance filter: which change-log entries to show a returning
//! user.
//!
//! An event is relevant when its type is one of the notifiable types and it
//! happened after the user's last login OR inside the trailing lookback
//! window (the union of both conditions, not the intersection).
//!
//! The filter never looks at who made a change.

use chrono::{DateTime, Duration, Utc};

use uvv_contracts::change::{ChangeEvent, ChangeType};

/// Default length of the trailing window, in hours.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// Event types surfaced at login.
pub const NOTIFIABLE: [ChangeType; 4] = [
    ChangeType::Created,
    ChangeType::Updated,
    ChangeType::Deleted,
    ChangeType::StatusChanged,
];

/// Select relevant events with the default 24-hour lookback window.
///
/// The result is ordered newest first; events with equal timestamps keep
/// their log order.
pub fn select_relevant_changes(
    events: &[ChangeEvent],
    last_login: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<&ChangeEvent> {
    select_relevant_changes_within(
        events,
        last_login,
        now,
        Duration::hours(DEFAULT_LOOKBACK_HOURS),
    )
}

/// Select relevant events with an explicit lookback window.
pub fn select_relevant_changes_within(
    events: &[ChangeEvent],
    last_login: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Vec<&ChangeEvent> {
    let window_start = now
        .checked_sub_signed(lookback)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut relevant: Vec<&ChangeEvent> = events
        .iter()
        .filter(|event| is_relevant(event, last_login, window_start))
        .collect();

    // Vec::sort_by is stable, so ties keep log order.
    relevant.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    relevant
}

/// The relevance predicate for a single event.
pub fn is_relevant(
    event: &ChangeEvent,
    last_login: Option<DateTime<Utc>>,
    window_start: DateTime<Utc>,
) -> bool {
    if !NOTIFIABLE.contains(&event.change_type) {
        return false;
    }

    match last_login {
        None => true,
        Some(login) => event.timestamp > login || event.timestamp > window_start,
    }
}
