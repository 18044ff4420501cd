//! Tool for booking a time entry described in natural language.
//!
//! The text runs through leave classification, duration extraction, project
//! lookup, date extraction and task lookup before anything is written. A
//! missing duration fails before any Harvest call; a missing date fails only
//! once the project is known, so an unknown project is reported first.

use chrono::{DateTime, Local};
use rmcp::{ErrorData, handler::server::wrapper::Parameters, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::mcp::{
    catalog::{resolve_project, resolve_task},
    config::Config,
    http::HarvestClient,
    nlp::{ParsedTimeEntry, classify, entry_date, entry_hours},
    tools::json_text,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogTimeRequest {
    #[schemars(
        description = "Natural language time entry (e.g. \"2 hours on Project X doing development work yesterday\", \"sick today\", \"annual leave tomorrow\")"
    )]
    pub text: String,
}

/// Body of `POST /time_entries`.
pub fn time_entry_payload(
    entry: &ParsedTimeEntry,
    project_id: u64,
    task_id: u64,
    notes: &str,
) -> Value {
    json!({
        "project_id": project_id,
        "task_id": task_id,
        "spent_date": entry.spent_date.format("%Y-%m-%d").to_string(),
        "hours": entry.hours,
        "notes": notes,
    })
}

pub async fn log_time(
    client: &HarvestClient,
    config: &Config,
    now: DateTime<Local>,
    Parameters(LogTimeRequest { text }): Parameters<LogTimeRequest>,
) -> Result<CallToolResult, ErrorData> {
    let leave_type = classify(&text);
    let hours = entry_hours(&text, leave_type, config.standard_work_day_hours)?;

    let project_id = resolve_project(client, &text, leave_type).await?;
    let spent_date = entry_date(&text, leave_type, &now)?;
    let task_id = resolve_task(client, project_id, &text, leave_type).await?;

    let entry = ParsedTimeEntry {
        spent_date,
        hours,
        leave_type,
    };
    info!(
        project_id,
        task_id,
        spent_date = %entry.spent_date,
        hours = entry.hours,
        leave = entry.is_leave(),
        "logging time entry"
    );

    let created = client
        .post("/time_entries", &time_entry_payload(&entry, project_id, task_id, &text))
        .await?;
    json_text(&created)
}
