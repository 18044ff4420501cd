//! Tool for listing the tasks assigned to one project.

use rmcp::{ErrorData, handler::server::wrapper::Parameters, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::mcp::{
    catalog::{Task, fetch_task_assignments},
    http::HarvestClient,
    tools::json_text,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksRequest {
    #[schemars(description = "Harvest project ID, e.g. 14307913")]
    pub project_id: u64,
}

/// Returns `[{id, name}, ...]` for the project's task assignments.
pub async fn list_tasks(
    client: &HarvestClient,
    Parameters(ListTasksRequest { project_id }): Parameters<ListTasksRequest>,
) -> Result<CallToolResult, ErrorData> {
    let tasks: Vec<Task> = fetch_task_assignments(client, project_id)
        .await?
        .into_iter()
        .map(|assignment| assignment.task)
        .collect();
    info!(project_id, count = tasks.len(), "listed tasks");
    json_text(&tasks)
}
