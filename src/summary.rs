//! Derived roster statistics and name filtering.
//!
//! Pure computation over the current collection, recomputed on every call.
//! The roster is small and access is synchronous, so nothing is cached.

use serde::Serialize;

use crate::Amount;
use crate::model::StudentRecord;

/// Roster totals shown on the summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub total_students: usize,
    pub unpaid_students: usize,
    pub total_debt: Amount,
}

impl RosterSummary {
    pub fn of(students: &[StudentRecord]) -> Self {
        Self {
            total_students: students.len(),
            unpaid_students: students.iter().filter(|s| !s.is_paid).count(),
            total_debt: students.iter().map(|s| s.debt).sum(),
        }
    }
}

/// Records whose first or last name contains `query`, case-insensitively.
///
/// The query is not trimmed or normalized beyond case folding; an empty query
/// matches everything. Insertion order is preserved.
pub fn filter_by_name<'a>(students: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    let needle = query.to_lowercase();
    students
        .iter()
        .filter(|s| {
            s.first_name.to_lowercase().contains(&needle)
                || s.last_name.to_lowercase().contains(&needle)
        })
        .collect()
}
