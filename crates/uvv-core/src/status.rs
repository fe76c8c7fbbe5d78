//! Status engine: inspection date → compliance status.
//!
//! Two textual encodings are accepted for the inspection month:
//!
//! - `"YYYY-MM"` (checked first, whenever the value contains `-`)
//! - `"MM/YYYY"` (whenever the value contains `/` but no `-`)
//!
//! Each must split into exactly two integer parts. The parsed month is the
//! month the inspection was performed; the status depends only on how many
//! whole calendar months have passed since then:
//!
//! | months elapsed | status |
//! |----------------|--------|
//! | < 11           | green  |
//! | 11             | yellow |
//! | >= 12          | red    |
//!
//! Every function here is pure and total. Anything that cannot be parsed is
//! red; nothing returns an error.

use chrono::{Datelike, NaiveDate};

use uvv_contracts::{
    machine::MachineRecord,
    status::{ComplianceStatus, InspectionDate},
};

/// Months after which an inspection is due next month.
pub const WARNING_MONTHS: i64 = 11;

/// Months after which an inspection is overdue.
pub const OVERDUE_MONTHS: i64 = 12;

/// Parse an inspection value in either accepted format.
///
/// Returns `None` for any other shape, including a wrong part count or a
/// non-integer part. Values are not range-checked.
pub fn parse_inspection_date(value: &str) -> Option<InspectionDate> {
    let (year, month) = if value.contains('-') {
        split_pair(value, '-')?
    } else if value.contains('/') {
        let (month, year) = split_pair(value, '/')?;
        (year, month)
    } else {
        return None;
    };

    Some(InspectionDate {
        year: parse_part(year)?,
        month: parse_part(month)?,
    })
}

/// Whole calendar months from the inspection month to `today`'s month.
///
/// Negative when the inspection date lies in the future. `None` only when
/// the parsed numbers overflow.
pub fn months_elapsed(date: InspectionDate, today: NaiveDate) -> Option<i64> {
    let now_index = i64::from(today.year()) * 12 + i64::from(today.month());
    now_index.checked_sub(date.month_index()?)
}

/// Derive the compliance status of an inspection value as of `today`.
///
/// Absent, empty and malformed values are red.
pub fn derive_status(value: Option<&str>, today: NaiveDate) -> ComplianceStatus {
    let elapsed = value
        .and_then(parse_inspection_date)
        .and_then(|date| months_elapsed(date, today));

    match elapsed {
        Some(months) if months >= OVERDUE_MONTHS => ComplianceStatus::Red,
        Some(WARNING_MONTHS) => ComplianceStatus::Yellow,
        Some(_) => ComplianceStatus::Green,
        None => ComplianceStatus::Red,
    }
}

/// Shorthand for `derive_status` on a record's inspection value.
pub fn record_status(record: &MachineRecord, today: NaiveDate) -> ComplianceStatus {
    derive_status(record.inspection_due.as_deref(), today)
}

/// Normalize an inspection value to `"MM/YYYY"` for display.
///
/// `"YYYY-MM"` is rewritten, `"MM/YYYY"` passes through, absent or empty is
/// `"-"`, and anything unrecognized is returned unchanged.
pub fn format_for_display(value: Option<&str>) -> String {
    match value {
        None | Some("") => "-".to_string(),
        Some(v) if v.contains('-') => match split_pair(v, '-') {
            Some((year, month)) => format!("{}/{}", month, year),
            None => v.to_string(),
        },
        Some(v) => v.to_string(),
    }
}

fn split_pair(value: &str, separator: char) -> Option<(&str, &str)> {
    let mut parts = value.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second))
}

fn parse_part(part: &str) -> Option<i64> {
    part.trim().parse().ok()
}
