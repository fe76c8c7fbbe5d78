//! # uvv-core
//!
//! Decision logic and session handling for the UVV compliance tracker.
//!
//! This crate provides:
//! - The status engine (`status`): inspection date → green / yellow / red
//! - The change relevance filter (`relevance`) and login notice (`notice`)
//! - The event-recording policy (`recording`)
//! - The collaborator traits (`DocumentStore`, `ChangeWriter`)
//! - The `Tracker`, which wires them together for one user session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uvv_core::{Tracker, status::derive_status};
//!
//! let mut tracker = Tracker::new(Box::new(store), Box::new(change_writer), "Felix");
//! let previous_login = tracker.sign_in(Utc::now())?;
//! tracker.load()?;
//! let notice = tracker.login_notice(previous_login, Utc::now())?;
//! ```

pub mod filter;
pub mod notice;
pub mod paths;
pub mod recording;
pub mod relevance;
pub mod status;
pub mod tracker;
pub mod traits;
pub mod validate;

pub use tracker::{SaveOutcome, Tracker};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use uvv_contracts::{
        change::{ChangeEvent, ChangeType},
        error::UvvError,
        machine::{MachineDraft, MachineRecord, StoredMachine},
        status::ComplianceStatus,
    };

    use crate::{
        filter::MachineFilter,
        notice::build_login_notice,
        paths, recording,
        relevance::{select_relevant_changes, select_relevant_changes_within},
        status::{derive_status, format_for_display, parse_inspection_date},
        validate,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn june_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(number: &str, inspection: Option<&str>) -> MachineRecord {
        MachineRecord {
            equipment_number: number.to_string(),
            manufacturer: Some("Linde".to_string()),
            model: Some("H25".to_string()),
            department: "Logistics".to_string(),
            service_type: None,
            operating_hours: Some(1200.0),
            inspection_due: inspection.map(str::to_string),
            comment: None,
            last_change: None,
            legacy_type: None,
        }
    }

    fn stored(number: &str, inspection: Option<&str>) -> StoredMachine {
        StoredMachine {
            id: paths::sanitize_key(number),
            record: record(number, inspection),
        }
    }

    fn event_at(change_type: ChangeType, machine_id: &str, at: DateTime<Utc>) -> ChangeEvent {
        ChangeEvent {
            change_type,
            machine_id: machine_id.to_string(),
            machine_data: json!({ "equipment_number": machine_id }),
            old_data: None,
            user: "Rolf".to_string(),
            timestamp: at,
        }
    }

    // ── Status engine ─────────────────────────────────────────────────────────

    #[test]
    fn both_formats_derive_the_same_status() {
        assert_eq!(
            derive_status(Some("2024-06"), june_2024()),
            derive_status(Some("06/2024"), june_2024())
        );
        assert_eq!(derive_status(Some("2024-06"), june_2024()), ComplianceStatus::Green);
    }

    #[test]
    fn thresholds_are_exact() {
        assert_eq!(derive_status(Some("2023-08"), june_2024()), ComplianceStatus::Green);
        assert_eq!(derive_status(Some("2023-07"), june_2024()), ComplianceStatus::Yellow);
        assert_eq!(derive_status(Some("2023-06"), june_2024()), ComplianceStatus::Red);
        assert_eq!(derive_status(Some("07/2023"), june_2024()), ComplianceStatus::Yellow);
        assert_eq!(derive_status(Some("01/2020"), june_2024()), ComplianceStatus::Red);
    }

    #[test]
    fn day_of_month_is_ignored() {
        let end_of_june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(derive_status(Some("2023-07"), end_of_june), ComplianceStatus::Yellow);
        assert_eq!(derive_status(Some("2023-08"), end_of_june), ComplianceStatus::Green);
    }

    #[test]
    fn future_inspection_is_green() {
        assert_eq!(derive_status(Some("2025-01"), june_2024()), ComplianceStatus::Green);
    }

    #[test]
    fn unusable_values_are_red() {
        let inputs = [
            None,
            Some(""),
            Some("garbage"),
            Some("2024"),
            Some("2024-06-01"),
            Some("06/2024/1"),
            Some("-06"),
            Some("2024-xx"),
            Some("ab/2024"),
            Some("2024.06"),
            Some("2024/06-"),
            Some("99999999999999999999-01"),
            Some("9000000000000000000-01"),
        ];
        for input in inputs {
            assert_eq!(
                derive_status(input, june_2024()),
                ComplianceStatus::Red,
                "input {:?} should be red",
                input
            );
        }
    }

    #[test]
    fn months_are_not_range_checked() {
        // Month 13 of 2023 is January 2024: five months before June 2024.
        assert_eq!(derive_status(Some("2023-13"), june_2024()), ComplianceStatus::Green);
        // Month 18 of 2022 is June 2023: twelve months.
        assert_eq!(derive_status(Some("2022-18"), june_2024()), ComplianceStatus::Red);
    }

    #[test]
    fn surrounding_whitespace_in_parts_is_tolerated() {
        assert_eq!(derive_status(Some(" 2023-07 "), june_2024()), ComplianceStatus::Yellow);
        let parsed = parse_inspection_date("07 / 2023").unwrap();
        assert_eq!((parsed.year, parsed.month), (2023, 7));
    }

    #[test]
    fn derive_status_is_idempotent() {
        for input in [Some("2023-07"), Some("bogus"), None] {
            assert_eq!(derive_status(input, june_2024()), derive_status(input, june_2024()));
        }
    }

    #[test]
    fn display_format_normalizes_to_month_slash_year() {
        assert_eq!(format_for_display(Some("2024-06")), "06/2024");
        assert_eq!(format_for_display(Some("06/2024")), "06/2024");
        assert_eq!(format_for_display(None), "-");
        assert_eq!(format_for_display(Some("")), "-");
        assert_eq!(format_for_display(Some("soon")), "soon");
        assert_eq!(format_for_display(Some("2024-06-01")), "2024-06-01");
    }

    // ── Relevance filter ──────────────────────────────────────────────────────

    #[test]
    fn relevance_is_union_of_login_and_window() {
        let now = t();
        let last_login = Some(now - Duration::hours(30));
        let events = vec![
            event_at(ChangeType::Updated, "A", now - Duration::hours(25)),
            event_at(ChangeType::Updated, "B", now - Duration::hours(40)),
        ];

        let relevant = select_relevant_changes(&events, last_login, now);
        let ids: Vec<&str> = relevant.iter().map(|e| e.machine_id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);
    }

    #[test]
    fn window_includes_events_before_a_recent_login() {
        let now = t();
        // Logged in an hour ago; an event from three hours ago is still in
        // the trailing 24 hours.
        let last_login = Some(now - Duration::hours(1));
        let events = vec![event_at(ChangeType::Created, "A", now - Duration::hours(3))];

        assert_eq!(select_relevant_changes(&events, last_login, now).len(), 1);
    }

    #[test]
    fn no_last_login_means_everything() {
        let now = t();
        let events = vec![
            event_at(ChangeType::Deleted, "A", now - Duration::days(400)),
            event_at(ChangeType::StatusChanged, "B", now - Duration::days(2)),
        ];
        assert_eq!(select_relevant_changes(&events, None, now).len(), 2);
    }

    #[test]
    fn relevant_changes_are_newest_first() {
        let now = t();
        let events = vec![
            event_at(ChangeType::Updated, "1h", now - Duration::hours(1)),
            event_at(ChangeType::Updated, "3h", now - Duration::hours(3)),
            event_at(ChangeType::Updated, "2h", now - Duration::hours(2)),
        ];

        let ids: Vec<&str> = select_relevant_changes(&events, None, now)
            .iter()
            .map(|e| e.machine_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1h", "2h", "3h"]);
    }

    #[test]
    fn equal_timestamps_keep_log_order() {
        let now = t();
        let at = now - Duration::hours(2);
        let events = vec![
            event_at(ChangeType::Created, "first", at),
            event_at(ChangeType::Updated, "second", at),
            event_at(ChangeType::Updated, "newest", now - Duration::minutes(5)),
        ];

        let ids: Vec<&str> = select_relevant_changes(&events, None, now)
            .iter()
            .map(|e| e.machine_id.as_str())
            .collect();
        assert_eq!(ids, vec!["newest", "first", "second"]);
    }

    #[test]
    fn own_changes_are_not_filtered_out() {
        let now = t();
        let mut own = event_at(ChangeType::Updated, "A", now - Duration::hours(1));
        own.user = "Felix".to_string();

        let events = vec![own];
        let relevant = select_relevant_changes(&events, Some(now - Duration::hours(2)), now);
        assert_eq!(relevant.len(), 1);
        assert!(relevant[0].is_authored_by("Felix"));
    }

    #[test]
    fn custom_lookback_window() {
        let now = t();
        let last_login = Some(now - Duration::hours(1));
        let events = vec![event_at(ChangeType::Updated, "A", now - Duration::hours(30))];

        assert!(select_relevant_changes(&events, last_login, now).is_empty());
        assert_eq!(
            select_relevant_changes_within(&events, last_login, now, Duration::hours(48)).len(),
            1
        );
    }

    // ── Event-recording policy ────────────────────────────────────────────────

    #[test]
    fn status_transition_records_status_changed() {
        let old = record("FG-1", Some("2023-08"));
        let new = record("FG-1", Some("2023-07"));

        let event = recording::update_event("FG-1", &old, &new, "Felix", t()).unwrap();

        assert_eq!(event.change_type, ChangeType::StatusChanged);
        assert_eq!(event.previous_status(), Some(ComplianceStatus::Green));
        assert_eq!(event.new_status(), Some(ComplianceStatus::Yellow));
        assert_eq!(event.old_data, Some(json!({ "status": "green" })));
        assert_eq!(event.machine_data["inspection_due"], "2023-07");
    }

    #[test]
    fn any_status_delta_is_a_transition() {
        // Red → green (a renewed inspection) is recorded the same way.
        let old = record("FG-1", Some("2022-01"));
        let new = record("FG-1", Some("2024-05"));

        let event = recording::update_event("FG-1", &old, &new, "Felix", t()).unwrap();
        assert_eq!(event.change_type, ChangeType::StatusChanged);
        assert_eq!(event.previous_status(), Some(ComplianceStatus::Red));
        assert_eq!(event.new_status(), Some(ComplianceStatus::Green));
    }

    #[test]
    fn unchanged_status_records_updated_with_full_old_record() {
        let old = record("FG-1", Some("2024-01"));
        let mut new = record("FG-1", Some("2024-02"));
        new.comment = Some("new tyres".to_string());

        let event = recording::update_event("FG-1", &old, &new, "Felix", t()).unwrap();

        assert_eq!(event.change_type, ChangeType::Updated);
        let old_data = event.old_data.as_ref().unwrap();
        assert_eq!(old_data["inspection_due"], "2024-01");
        assert_eq!(old_data["department"], "Logistics");
        assert!(event.machine_data.get("status").is_none());
        assert_eq!(event.machine_data["comment"], "new tyres");
    }

    #[test]
    fn create_and_delete_events_have_no_prior_state() {
        let rec = record("FG-2", None);

        let created = recording::created_event("FG-2", &rec, "Rolf", t()).unwrap();
        assert_eq!(created.change_type, ChangeType::Created);
        assert!(created.old_data.is_none());

        let deleted = recording::deleted_event("FG-2", &rec, "Rolf", t()).unwrap();
        assert_eq!(deleted.change_type, ChangeType::Deleted);
        assert!(deleted.old_data.is_none());
        assert_eq!(deleted.machine_data["equipment_number"], "FG-2");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn equipment_number_is_trimmed_and_uppercased() {
        assert_eq!(validate::normalize_equipment_number("  fg-12a ").unwrap(), "FG-12A");
        assert!(matches!(
            validate::normalize_equipment_number("   "),
            Err(UvvError::MissingEquipmentNumber)
        ));
    }

    #[test]
    fn build_record_rejects_missing_department_and_negative_hours() {
        let draft = MachineDraft {
            equipment_number: "FG-1".to_string(),
            department: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            validate::build_record(&draft, "FG-1".to_string(), "Felix", t()),
            Err(UvvError::Validation { .. })
        ));

        let draft = MachineDraft {
            equipment_number: "FG-1".to_string(),
            department: "Workshop".to_string(),
            operating_hours: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            validate::build_record(&draft, "FG-1".to_string(), "Felix", t()),
            Err(UvvError::Validation { .. })
        ));
    }

    #[test]
    fn build_record_drops_blank_optionals_and_stamps_user() {
        let draft = MachineDraft {
            equipment_number: "FG-1".to_string(),
            department: "Workshop".to_string(),
            manufacturer: Some("".to_string()),
            comment: Some("ok".to_string()),
            ..Default::default()
        };
        let rec = validate::build_record(&draft, "FG-1".to_string(), "Felix", t()).unwrap();
        assert_eq!(rec.manufacturer, None);
        assert_eq!(rec.comment.as_deref(), Some("ok"));
        let stamp = rec.last_change.unwrap();
        assert_eq!(stamp.user, "Felix");
        assert_eq!(stamp.timestamp, t());
    }

    // ── Paths ─────────────────────────────────────────────────────────────────

    #[test]
    fn store_keys_are_sanitized() {
        assert_eq!(paths::sanitize_key("FG.1#2$3[4]5/6"), "FG_1_2_3_4_5_6");
        assert_eq!(paths::machine("FG-1"), "machines/FG-1");
        assert_eq!(paths::last_login("Felix"), "userLastLogin/Felix");
    }

    // ── Filter ────────────────────────────────────────────────────────────────

    #[test]
    fn filter_matches_case_insensitively() {
        let machines = vec![stored("FG-1", Some("2024-05")), stored("XY-2", Some("2023-07"))];

        let filter = MachineFilter {
            equipment_number: Some("fg".to_string()),
            ..Default::default()
        };
        let hits = filter.apply(&machines, june_2024());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "FG-1");
    }

    #[test]
    fn filter_by_status() {
        let machines = vec![
            stored("A", Some("2024-05")),
            stored("B", Some("2023-07")),
            stored("C", None),
        ];
        let filter = MachineFilter {
            status: Some(ComplianceStatus::Yellow),
            ..Default::default()
        };
        let hits: Vec<&str> = filter
            .apply(&machines, june_2024())
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(hits, vec!["B"]);
    }

    #[test]
    fn absent_optional_field_passes_its_criterion() {
        let mut no_comment = stored("A", None);
        no_comment.record.comment = None;
        let mut other_comment = stored("B", None);
        other_comment.record.comment = Some("leaking".to_string());

        let filter = MachineFilter {
            comment: Some("brake".to_string()),
            ..Default::default()
        };
        let machines = vec![no_comment, other_comment];
        let hits: Vec<&str> = filter
            .apply(&machines, june_2024())
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(hits, vec!["A"]);
    }

    #[test]
    fn filter_hours_textually_and_ignore_blank_criteria() {
        let machines = vec![stored("A", None)];
        let filter = MachineFilter {
            operating_hours: Some("120".to_string()),
            model: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&machines, june_2024()).len(), 1);

        assert!(MachineFilter::default().is_empty());
        assert!(MachineFilter {
            model: Some(String::new()),
            ..Default::default()
        }
        .is_empty());
        assert!(!filter.is_empty());
    }

    // ── Login notice ──────────────────────────────────────────────────────────

    #[test]
    fn login_notice_lists_red_before_yellow_with_transitions() {
        let now = t();
        let machines = vec![
            stored("GREEN", Some("2024-05")),
            stored("YELLOW", Some("2023-07")),
            stored("RED", Some("2022-01")),
        ];

        let mut transition = event_at(ChangeType::StatusChanged, "YELLOW", now - Duration::hours(2));
        transition.machine_data = json!({ "equipment_number": "YELLOW", "status": "yellow" });
        transition.old_data = Some(json!({ "status": "green" }));
        let events = vec![transition];

        let notice =
            build_login_notice(&machines, &events, Some(now - Duration::hours(5)), now, Duration::hours(24));

        let order: Vec<&str> = notice.attention.iter().map(|a| a.machine.id.as_str()).collect();
        assert_eq!(order, vec!["RED", "YELLOW"]);
        assert!(notice.attention[0].recent_transition.is_none());
        let annotated = notice.attention[1].recent_transition.as_ref().unwrap();
        assert_eq!(annotated.previous_status(), Some(ComplianceStatus::Green));
        assert_eq!(notice.changes.len(), 1);
        assert!(!notice.is_empty());
    }

    #[test]
    fn login_notice_is_empty_for_a_compliant_quiet_fleet() {
        let now = t();
        let machines = vec![stored("A", Some("2024-05"))];
        let notice = build_login_notice(&machines, &[], None, now, Duration::hours(24));
        assert!(notice.is_empty());
    }
}
