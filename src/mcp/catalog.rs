//! Project and task lookup against the live Harvest catalog.
//!
//! Nothing is cached: every resolution fetches the current list and matches in
//! the order Harvest returned it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::mcp::{error::HarvestError, http::HarvestClient, nlp::LeaveType};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskAssignment {
    pub task: Task,
}

#[derive(Deserialize)]
struct ProjectPage {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct TaskAssignmentPage {
    task_assignments: Vec<TaskAssignment>,
}

/// `GET /projects`.
///
/// # Errors
/// Transport and API errors from the client, `Serialization` for unexpected bodies.
pub async fn fetch_projects(client: &HarvestClient) -> Result<Vec<Project>, HarvestError> {
    let json: Value = client.get("/projects", &[]).await?;
    let page: ProjectPage = serde_json::from_value(json)?;
    Ok(page.projects)
}

/// `GET /projects/{project_id}/task_assignments`.
///
/// # Errors
/// Same as [`fetch_projects`].
pub async fn fetch_task_assignments(
    client: &HarvestClient,
    project_id: u64,
) -> Result<Vec<TaskAssignment>, HarvestError> {
    let json = client
        .get(&format!("/projects/{project_id}/task_assignments"), &[])
        .await?;
    let page: TaskAssignmentPage = serde_json::from_value(json)?;
    Ok(page.task_assignments)
}

/// Picks the project for `text`.
///
/// Leave entries first look for the leave project by exact name; otherwise
/// (or if it is missing) the first project whose lowercased name occurs in the
/// lowercased text wins.
///
/// # Errors
/// `InvalidInput` when no project matches.
pub fn select_project(
    projects: &[Project],
    text: &str,
    leave_type: Option<LeaveType>,
) -> Result<u64, HarvestError> {
    if let Some(leave_type) = leave_type {
        let wanted = leave_type.pattern().project;
        if let Some(project) = projects.iter().find(|p| p.name == wanted) {
            return Ok(project.id);
        }
        debug!(%leave_type, project = wanted, "leave project not found, matching by name");
    }

    let lowercase_text = text.to_lowercase();
    projects
        .iter()
        .find(|p| lowercase_text.contains(&p.name.to_lowercase()))
        .map(|p| p.id)
        .ok_or_else(|| HarvestError::invalid_input("Could not find matching project"))
}

/// Picks the task for `text` within one project's assignments.
///
/// When no task name occurs in the text the first assignment is used, so an
/// entry can land on a task the user never named.
///
/// # Errors
/// `InvalidInput` when the project has no task assignments.
pub fn select_task(
    assignments: &[TaskAssignment],
    project_id: u64,
    text: &str,
    leave_type: Option<LeaveType>,
) -> Result<u64, HarvestError> {
    if let Some(leave_type) = leave_type {
        let wanted = leave_type.pattern().task;
        if let Some(assignment) = assignments.iter().find(|a| a.task.name == wanted) {
            return Ok(assignment.task.id);
        }
        debug!(%leave_type, task = wanted, "leave task not found, matching by name");
    }

    let lowercase_text = text.to_lowercase();
    if let Some(assignment) = assignments
        .iter()
        .find(|a| lowercase_text.contains(&a.task.name.to_lowercase()))
    {
        return Ok(assignment.task.id);
    }

    let fallback = assignments.first().ok_or_else(|| {
        HarvestError::invalid_input(format!("No tasks are assigned to project {project_id}"))
    })?;
    debug!(
        project_id,
        task_id = fallback.task.id,
        "no task named in text, using first assignment"
    );
    Ok(fallback.task.id)
}

/// Fetches the live project list and resolves `text` against it.
///
/// # Errors
/// See [`fetch_projects`] and [`select_project`].
pub async fn resolve_project(
    client: &HarvestClient,
    text: &str,
    leave_type: Option<LeaveType>,
) -> Result<u64, HarvestError> {
    let projects = fetch_projects(client).await?;
    select_project(&projects, text, leave_type)
}

/// Fetches the project's task assignments and resolves `text` against them.
///
/// # Errors
/// See [`fetch_task_assignments`] and [`select_task`].
pub async fn resolve_task(
    client: &HarvestClient,
    project_id: u64,
    text: &str,
    leave_type: Option<LeaveType>,
) -> Result<u64, HarvestError> {
    let assignments = fetch_task_assignments(client, project_id).await?;
    select_task(&assignments, project_id, text, leave_type)
}
