//! Completed-session reports and the append-only ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::{GameType, round_money};

/// Immutable summary of one completed session.
///
/// Created exactly once, at session end; never mutated; removed only
/// by the bulk delete-all administrative action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub device_id: String,
    /// UTC calendar day of the session end, for date filtering.
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub game_type: GameType,
    /// Billed amount, two-decimal precision.
    pub cost: f64,
}

/// Append-only collection of completed-session reports.
#[derive(Debug, Default)]
pub struct ReportLedger {
    reports: Vec<Report>,
}

impl ReportLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored reports.
    #[must_use]
    pub fn from_reports(reports: impl IntoIterator<Item = Report>) -> Self {
        Self {
            reports: reports.into_iter().collect(),
        }
    }

    /// Appends a report. Always succeeds; the session engine guarantees
    /// well-formed records.
    pub fn append(&mut self, report: Report) {
        tracing::debug!(id = %report.id, device = %report.device_id, cost = report.cost, "report appended");
        self.reports.push(report);
    }

    /// Reports for one calendar day, ordered by start time ascending.
    #[must_use]
    pub fn query_by_date(&self, date: NaiveDate) -> Vec<Report> {
        let mut matches: Vec<Report> = self
            .reports
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.start_time);
        matches
    }

    /// Total billed revenue for one calendar day.
    #[must_use]
    pub fn revenue_for(&self, date: NaiveDate) -> f64 {
        round_money(
            self.reports
                .iter()
                .filter(|r| r.date == date)
                .map(|r| r.cost)
                .sum(),
        )
    }

    /// Bulk administrative wipe. The only deletion path that exists.
    pub fn delete_all(&mut self) -> usize {
        let removed = self.reports.len();
        tracing::info!(removed, "all reports deleted");
        self.reports.clear();
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
