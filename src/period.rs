// src/period.rs
use chrono::{Datelike, NaiveDate};

/// The previous calendar month, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportingPeriod {
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_this_month = today.with_day(1).unwrap_or(today);
        let to = first_this_month.pred_opt().unwrap_or(first_this_month);
        let from = to.with_day(1).unwrap_or(to);
        Self { from, to }
    }

    /// Unix seconds at 00:00 UTC on `from`.
    pub fn from_timestamp(&self) -> i64 {
        self.from
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0)
    }

    /// e.g. "September 1, 2026 through September 30, 2026"
    pub fn describe(&self) -> String {
        format!(
            "{} through {}",
            self.from.format("%B %-d, %Y"),
            self.to.format("%B %-d, %Y")
        )
    }
}
