//! Tool for listing the account's Harvest projects.

use rmcp::{ErrorData, model::CallToolResult};
use tracing::info;

use crate::mcp::{catalog::fetch_projects, http::HarvestClient, tools::json_text};

/// Returns `[{id, name, code, is_active}, ...]` in Harvest order.
pub async fn list_projects(client: &HarvestClient) -> Result<CallToolResult, ErrorData> {
    let projects = fetch_projects(client).await?;
    info!(count = projects.len(), "listed projects");
    json_text(&projects)
}
