//! Compliance status and parsed inspection date types.
//!
//! `ComplianceStatus` is derived, never stored on a record. It only appears
//! in persisted form inside change-event snapshots, where it is written as a
//! lowercase string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Traffic-light classification of a machine's periodic inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    /// Inspected less than 11 months ago.
    Green,
    /// Inspected exactly 11 months ago; due next month.
    Yellow,
    /// Overdue, or no usable inspection date.
    Red,
}

impl ComplianceStatus {
    /// True for statuses that should be surfaced at login (yellow or red).
    pub fn needs_attention(self) -> bool {
        matches!(self, ComplianceStatus::Yellow | ComplianceStatus::Red)
    }

    /// Sort rank, most severe first: red = 0, yellow = 1, green = 2.
    pub fn severity_rank(self) -> u8 {
        match self {
            ComplianceStatus::Red => 0,
            ComplianceStatus::Yellow => 1,
            ComplianceStatus::Green => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceStatus::Green => "green",
            ComplianceStatus::Yellow => "yellow",
            ComplianceStatus::Red => "red",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed inspection date: the month an inspection was performed.
///
/// Neither field is range-checked. `month` is 1-based as written in the
/// source text, so month 13 of one year is equivalent to month 1 of the next
/// for elapsed-month arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionDate {
    pub year: i64,
    pub month: i64,
}

impl InspectionDate {
    /// Months since year zero, used for elapsed-month arithmetic.
    ///
    /// `None` when the parsed numbers are too large to combine.
    pub fn month_index(self) -> Option<i64> {
        self.year.checked_mul(12)?.checked_add(self.month)
    }
}
