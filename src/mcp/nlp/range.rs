//! Report date windows.
//!
//! Calendar shortcuts are checked first, in a fixed order. Weeks start on
//! Sunday regardless of locale.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone};

use crate::mcp::{
    error::HarvestError,
    nlp::date::{date_at, first_date, is_connector, scan_words},
};

/// Inclusive report window with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ParsedDateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// `[("from", "YYYY-MM-DD"), ("to", "YYYY-MM-DD")]` for a Harvest query string.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("to", self.to.format("%Y-%m-%d").to_string()),
        ]
    }
}

fn last_month(today: NaiveDate) -> Option<ParsedDateRange> {
    let this_month_start = today.with_day(1)?;
    let from = this_month_start.checked_sub_months(Months::new(1))?;
    let to = this_month_start.pred_opt()?;
    Some(ParsedDateRange { from, to })
}

fn this_month(today: NaiveDate) -> Option<ParsedDateRange> {
    Some(ParsedDateRange {
        from: today.with_day(1)?,
        to: today,
    })
}

fn week_start(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(
        today.weekday().num_days_from_sunday(),
    )))
}

fn this_week(today: NaiveDate) -> Option<ParsedDateRange> {
    Some(ParsedDateRange {
        from: week_start(today)?,
        to: today,
    })
}

fn last_week(today: NaiveDate) -> Option<ParsedDateRange> {
    let from = week_start(today)?.checked_sub_days(Days::new(7))?;
    let to = from.checked_add_days(Days::new(6))?;
    Some(ParsedDateRange { from, to })
}

type Shortcut = fn(NaiveDate) -> Option<ParsedDateRange>;

const SHORTCUTS: [(&str, Shortcut); 4] = [
    ("last month", last_month),
    ("this month", this_month),
    ("this week", this_week),
    ("last week", last_week),
];

/// Derives the `(from, to)` window a report query talks about.
///
/// # Errors
/// `InvalidInput` when no shortcut matches and no date phrase can be found.
pub fn parse_date_range<Tz>(text: &str, now: &DateTime<Tz>) -> Result<ParsedDateRange, HarvestError>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let lowercase_text = text.to_lowercase();
    let today = now.date_naive();

    if let Some((_, shortcut)) = SHORTCUTS
        .iter()
        .find(|(phrase, _)| lowercase_text.contains(phrase))
    {
        return shortcut(today)
            .ok_or_else(|| HarvestError::invalid_input("Could not parse date range from input"));
    }

    let words = scan_words(text);
    let start = first_date(&words, 0, now)
        .ok_or_else(|| HarvestError::invalid_input("Could not parse date range from input"))?;

    let end = words
        .get(start.end)
        .filter(|w| is_connector(w))
        .and_then(|_| date_at(&words, start.end + 1, now));

    Ok(ParsedDateRange::new(
        start.date,
        end.map_or(start.date, |m| m.date),
    ))
}
