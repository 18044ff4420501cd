//! Spent-date extraction.
//!
//! The literal word "today" short-circuits to the reference date. Anything
//! else goes through `chrono-english`, which only understands whole date
//! phrases, so the text is scanned in word windows: leftmost start first,
//! longest window first. Duration tokens are masked beforehand so "3 hours"
//! is never read as a relative date.
//!
//! The library reads a lone number as a year and panics on relative offsets
//! it cannot represent, so windows made only of numbers or holding a number
//! longer than four digits are never handed to it. Dates more than ten years
//! from the reference instant are discarded and scanning continues.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use chrono_english::{Dialect, parse_date_string};
use regex::Regex;

use crate::mcp::error::HarvestError;

const MAX_WINDOW_WORDS: usize = 4;
const MAX_NUMBER_DIGITS: usize = 4;
const MAX_YEARS_FROM_NOW: i32 = 10;

/// Words that join two dates in a range; a window never spans one.
pub const RANGE_CONNECTORS: [&str; 6] = ["to", "until", "till", "through", "-", "and"];

static DURATION_WORD_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*(hours?|hrs?|h|minutes?|mins?|m)\b")
});

/// A date phrase found in a word list; `end` is the index just past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub end: usize,
}

/// Splits `text` into words for window scanning, dropping duration tokens and
/// surrounding punctuation.
pub fn scan_words(text: &str) -> Vec<String> {
    let masked = match DURATION_WORD_RE.as_ref() {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(_) => text.to_string(),
    };
    masked
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '"')))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_number(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_digit())
}

fn has_long_number(word: &str) -> bool {
    word.split(|c: char| !c.is_ascii_digit())
        .any(|run| run.len() > MAX_NUMBER_DIGITS)
}

/// Whether `window` is safe to give to the date library.
fn is_scannable(window: &[String]) -> bool {
    !window.iter().all(|w| is_number(w)) && !window.iter().any(|w| has_long_number(w))
}

/// Tries every window that begins exactly at `start`, longest first.
pub fn date_at<Tz>(words: &[String], start: usize, now: &DateTime<Tz>) -> Option<DateMatch>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let available = words
        .get(start..)?
        .iter()
        .take_while(|w| !is_connector(w))
        .count();
    let this_year = now.date_naive().year();
    (1..=available.min(MAX_WINDOW_WORDS)).rev().find_map(|len| {
        let window = words.get(start..start + len)?;
        if !is_scannable(window) {
            return None;
        }
        parse_date_string(&window.join(" "), now.clone(), Dialect::Uk)
            .ok()
            .map(|dt| dt.date_naive())
            .filter(|date| (date.year() - this_year).abs() <= MAX_YEARS_FROM_NOW)
            .map(|date| DateMatch {
                date,
                end: start + len,
            })
    })
}

pub fn is_connector(word: &str) -> bool {
    RANGE_CONNECTORS
        .iter()
        .any(|c| c.eq_ignore_ascii_case(word))
}

/// First date phrase at or after word `from`.
pub fn first_date<Tz>(words: &[String], from: usize, now: &DateTime<Tz>) -> Option<DateMatch>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    (from..words.len()).find_map(|start| date_at(words, start, now))
}

/// The calendar date a time entry should be booked against.
///
/// # Errors
/// `InvalidInput` when neither "today" nor a recognisable date phrase occurs.
pub fn parse_spent_date<Tz>(text: &str, now: &DateTime<Tz>) -> Result<NaiveDate, HarvestError>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    if text.to_lowercase().contains("today") {
        return Ok(now.date_naive());
    }

    first_date(&scan_words(text), 0, now)
        .map(|m| m.date)
        .ok_or_else(|| HarvestError::invalid_input("Could not parse date from input"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_short_circuits() {
        assert_eq!(
            parse_spent_date("2 hours on Acme Redesign doing dev work today", &now()).unwrap(),
            ymd(2025, 3, 15)
        );
        assert_eq!(parse_spent_date("TODAY", &now()).unwrap(), ymd(2025, 3, 15));
    }

    #[test]
    fn relative_days() {
        assert_eq!(
            parse_spent_date("annual leave tomorrow", &now()).unwrap(),
            ymd(2025, 3, 16)
        );
        assert_eq!(
            parse_spent_date("2 hours on Acme yesterday", &now()).unwrap(),
            ymd(2025, 3, 14)
        );
    }

    #[test]
    fn iso_dates() {
        assert_eq!(
            parse_spent_date("1 hour code review 2025-03-10", &now()).unwrap(),
            ymd(2025, 3, 10)
        );
    }

    #[test]
    fn no_date_is_invalid_input() {
        let err = parse_spent_date("2 hours on Acme", &now()).unwrap_err();
        assert!(
            matches!(err, HarvestError::InvalidInput(ref m) if m == "Could not parse date from input")
        );
    }

    #[test]
    fn numbers_in_names_are_not_years() {
        assert_eq!(
            parse_spent_date("1h on Phase 2 tomorrow", &now()).unwrap(),
            ymd(2025, 3, 16)
        );
        assert_eq!(
            parse_spent_date("2 hours on Project 42 yesterday", &now()).unwrap(),
            ymd(2025, 3, 14)
        );

        let friday = parse_spent_date("2 hours on Sprint 7 planning last friday", &now()).unwrap();
        assert_eq!(friday.year(), 2025);
        assert!(friday < ymd(2025, 3, 15));
    }

    #[test]
    fn bare_number_alone_is_not_a_date() {
        assert!(parse_spent_date("2 hours on Project 42", &now()).is_err());
    }

    #[test]
    fn oversized_offsets_are_invalid_input() {
        let err = parse_spent_date("2 hours on Acme 999999999 years ago", &now()).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidInput(_)));
        assert!(parse_spent_date("2 hours on Acme 99999 days ago", &now()).is_err());
    }

    #[test]
    fn window_screening() {
        let words = |s: &str| s.split(' ').map(str::to_string).collect::<Vec<_>>();
        assert!(!is_scannable(&words("42")));
        assert!(!is_scannable(&words("7 3")));
        assert!(!is_scannable(&words("123456 days ago")));
        assert!(is_scannable(&words("2025-03-10")));
        assert!(is_scannable(&words("3 days ago")));
    }

    #[test]
    fn scan_words_masks_durations_and_punctuation() {
        assert_eq!(
            scan_words("3 hours, 30min on Acme (yesterday)."),
            vec!["on", "Acme", "yesterday"]
        );
    }

    #[test]
    fn first_date_reports_word_span() {
        let words = scan_words("from yesterday to tomorrow");
        let m = first_date(&words, 0, &now()).unwrap();
        assert_eq!(m.date, ymd(2025, 3, 14));
        assert_eq!(words.get(m.end).map(String::as_str), Some("to"));
    }
}
