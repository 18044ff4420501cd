//! MCP tools for interacting with the Harvest API.
//!
//! Each module implements a specific tool:
//! - `log_time`: book a natural-language time entry
//! - `projects`: list the account's projects
//! - `tasks`: list the tasks assigned to a project
//! - `entries`: list time entries in an optional date window
//! - `time_report`: fetch a time report from a natural-language query
//!
//! All tools use the shared HTTP client and return their JSON as one text block.

pub mod entries;
pub mod log_time;
pub mod projects;
pub mod tasks;
pub mod time_report;

use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::mcp::error::HarvestError;

/// Pretty-prints `value` into a single text content item.
pub fn json_text<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value).map_err(HarvestError::from)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
