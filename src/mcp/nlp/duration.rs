//! Duration extraction ("2 hours", "30 min", "1h").

use std::sync::LazyLock;

use regex::Regex;

use crate::mcp::error::HarvestError;

static DURATION_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(hour|hr|h|minute|min|m)s?"));

/// Hours from the first duration token in `text`.
///
/// Units starting with `h` are hours, everything else is minutes.
///
/// # Errors
/// `InvalidInput` when no duration token is present.
pub fn parse_hours(text: &str) -> Result<f64, HarvestError> {
    let re = DURATION_RE
        .as_ref()
        .map_err(|e| HarvestError::invalid_input(e.to_string()))?;

    let captures = re
        .captures(text)
        .ok_or_else(|| HarvestError::invalid_input("Could not parse duration from input"))?;

    let amount = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(f64::from)
        .ok_or_else(|| HarvestError::invalid_input("Could not parse duration from input"))?;
    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();

    Ok(if unit.starts_with('h') {
        amount
    } else {
        amount / 60.0
    })
}
