//! Reporting window resolution
//!
//! The announcement always covers the calendar month before "today".

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// The calendar month a run reports on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMonth {
    /// Month number, 1-12
    pub number: u32,
    /// Full English month name (e.g. "January")
    pub name: String,
    pub year: i32,
}

/// Resolve the calendar month immediately before `today`
///
/// Uses calendar arithmetic, so January rolls back to December of the
/// previous year and month-end days clamp (March 31 resolves to February).
pub fn previous_month(today: NaiveDate) -> ReportMonth {
    // Subtracting one month only fails before year -262143
    let date = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN);

    ReportMonth {
        number: date.month(),
        name: date.format("%B").to_string(),
        year: date.year(),
    }
}

/// Whether `date` is the first day of its month
pub fn is_first_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}
