//! Natural-language parsing for time entries and report queries.
//!
//! - `leave`: leave classification against the fixed pattern registry
//! - `duration`: hour counts from "2 hours" / "30 min" tokens
//! - `date`: the spent date of a time entry
//! - `range`: the `(from, to)` window of a report query
//!
//! Every parser is pure and takes the reference instant explicitly.

pub mod date;
pub mod duration;
pub mod leave;
pub mod range;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::mcp::error::HarvestError;

pub use leave::{LeaveType, classify};
pub use range::parse_date_range;

/// Output of the log-time pipeline.
///
/// Leave entries always carry the configured work-day hours; other entries
/// carry the hours of their duration token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTimeEntry {
    pub spent_date: NaiveDate,
    pub hours: f64,
    pub leave_type: Option<LeaveType>,
}

impl ParsedTimeEntry {
    pub const fn is_leave(&self) -> bool {
        self.leave_type.is_some()
    }
}

/// Hours stage: leave entries take the work day, others need a duration token.
///
/// # Errors
/// `InvalidInput` when a non-leave entry has no duration token.
pub fn entry_hours(
    text: &str,
    leave_type: Option<LeaveType>,
    standard_work_day_hours: f64,
) -> Result<f64, HarvestError> {
    match leave_type {
        Some(_) => Ok(standard_work_day_hours),
        None => duration::parse_hours(text),
    }
}

/// Date stage. A leave entry without a recognisable date is booked for today.
///
/// # Errors
/// `InvalidInput` when a non-leave entry has no date phrase.
pub fn entry_date<Tz>(
    text: &str,
    leave_type: Option<LeaveType>,
    now: &DateTime<Tz>,
) -> Result<NaiveDate, HarvestError>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    match date::parse_spent_date(text, now) {
        Err(_) if leave_type.is_some() => Ok(now.date_naive()),
        other => other,
    }
}
