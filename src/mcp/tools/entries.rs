//! Tool for listing recorded time entries.

use rmcp::{ErrorData, handler::server::wrapper::Parameters, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::mcp::{error::HarvestError, http::HarvestClient, tools::json_text};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListEntriesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Start date (YYYY-MM-DD)")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "End date (YYYY-MM-DD)")]
    pub to: Option<String>,
}

#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Deserialize)]
struct TimeEntry {
    id: u64,
    spent_date: String,
    hours: f64,
    #[serde(default)]
    notes: Option<String>,
    project: NamedRef,
    task: NamedRef,
}

#[derive(Deserialize)]
struct TimeEntryPage {
    time_entries: Vec<TimeEntry>,
}

/// One row of the `list_entries` output.
#[derive(Debug, PartialEq, Serialize)]
pub struct EntrySummary {
    pub id: u64,
    pub spent_date: String,
    pub hours: f64,
    pub notes: Option<String>,
    pub project: String,
    pub task: String,
}

impl From<TimeEntry> for EntrySummary {
    fn from(entry: TimeEntry) -> Self {
        Self {
            id: entry.id,
            spent_date: entry.spent_date,
            hours: entry.hours,
            notes: entry.notes,
            project: entry.project.name,
            task: entry.task.name,
        }
    }
}

// Harvest validates the dates itself; blank values are treated as absent.
fn date_param(key: &'static str, value: Option<String>) -> Option<(&'static str, String)> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| (key, v))
}

/// `GET /time_entries`, forwarding `from`/`to` only when given.
pub async fn list_entries(
    client: &HarvestClient,
    Parameters(ListEntriesRequest { from, to }): Parameters<ListEntriesRequest>,
) -> Result<CallToolResult, ErrorData> {
    let query: Vec<(&str, String)> = [date_param("from", from), date_param("to", to)]
        .into_iter()
        .flatten()
        .collect();

    let json = client.get("/time_entries", &query).await?;
    let page: TimeEntryPage = serde_json::from_value(json).map_err(HarvestError::from)?;
    let entries: Vec<EntrySummary> = page.time_entries.into_iter().map(EntrySummary::from).collect();

    info!(?query, count = entries.len(), "listed time entries");
    json_text(&entries)
}
