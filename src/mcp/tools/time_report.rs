//! Tool for fetching Harvest time reports from a natural-language query.

use chrono::{DateTime, Local};
use rmcp::{ErrorData, handler::server::wrapper::Parameters, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::mcp::{http::HarvestClient, nlp::parse_date_range, report::route, tools::json_text};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TimeReportRequest {
    #[schemars(
        description = "Natural language query (e.g. \"Show time report for last month\", \"Get time summary by client for this week\")"
    )]
    pub text: String,
}

/// Picks the date window and report dimension, then returns Harvest's report verbatim.
pub async fn get_time_report(
    client: &HarvestClient,
    now: DateTime<Local>,
    Parameters(TimeReportRequest { text }): Parameters<TimeReportRequest>,
) -> Result<CallToolResult, ErrorData> {
    let range = parse_date_range(&text, &now)?;
    let dimension = route(&text);

    info!(%dimension, from = %range.from, to = %range.to, "fetching time report");

    let report = client.get(dimension.path(), &range.query()).await?;
    json_text(&report)
}
