//! Server configuration loaded once at start-up.

use std::env;

use crate::mcp::error::HarvestError;

pub const HARVEST_API_BASE_URL: &str = "https://api.harvestapp.com/v2";
pub const DEFAULT_WORK_DAY_HOURS: f64 = 7.5;
pub const DEFAULT_TIMEZONE: &str = "Australia/Perth";

/// Immutable for the lifetime of the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub access_token: String,
    pub account_id: String,
    pub standard_work_day_hours: f64,
    /// Recorded for forward compatibility; date math uses the local clock.
    pub timezone: String,
    pub base_url: String,
}

impl Config {
    /// Reads `HARVEST_ACCESS_TOKEN`, `HARVEST_ACCOUNT_ID`, `STANDARD_WORK_DAY_HOURS`,
    /// `TIMEZONE` and `HARVEST_BASE_URL` from the process environment.
    ///
    /// # Errors
    /// `MissingConfig` when a credential is unset or empty, `InvalidConfig` when
    /// the work-day hours are not a positive number.
    pub fn from_env() -> Result<Self, HarvestError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| HarvestError::MissingConfig(format!("{key} must be set")))
        };

        let access_token = required("HARVEST_ACCESS_TOKEN")?;
        let account_id = required("HARVEST_ACCOUNT_ID")?;

        let standard_work_day_hours = match lookup("STANDARD_WORK_DAY_HOURS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|h| h.is_finite() && *h > 0.0)
                .ok_or_else(|| {
                    HarvestError::InvalidConfig(format!(
                        "STANDARD_WORK_DAY_HOURS must be a positive number, got {raw:?}"
                    ))
                })?,
            _ => DEFAULT_WORK_DAY_HOURS,
        };

        let timezone = lookup("TIMEZONE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let base_url = lookup("HARVEST_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(
                || HARVEST_API_BASE_URL.to_string(),
                |v| v.trim_end_matches('/').to_string(),
            );

        Ok(Self {
            access_token,
            account_id,
            standard_work_day_hours,
            timezone,
            base_url,
        })
    }
}
