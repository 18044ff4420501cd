//! Harvest Model Context Protocol implementation.
//!
//! This crate turns natural-language tool calls into Harvest REST requests.
//! The implementation is organized into:
//!
//! - `config`: Environment-derived server configuration
//! - `error`: Error types and conversions
//! - `http`: HTTP client and API communication
//! - `nlp`: Leave, duration, date and date-range parsing
//! - `catalog`: Project/task resolution against the live Harvest catalog
//! - `report`: Report endpoint routing
//! - `tools`: Individual MCP tools
//!
//! The main entry point is the `HarvestMCPFactory` which provides the MCP server
//! implementation and manages all tools.

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod nlp;
pub mod report;
pub mod tools;

use std::sync::Arc;

use chrono::{DateTime, Local};
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, InitializeRequestParam, InitializeResult,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tracing::{error, info};

use crate::mcp::{
    config::Config,
    error::HarvestError,
    http::HarvestClient,
    tools::{
        entries::{self, ListEntriesRequest},
        log_time::{self, LogTimeRequest},
        projects,
        tasks::{self, ListTasksRequest},
        time_report::{self, TimeReportRequest},
    },
};

/// Source of "now" for date parsing.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

#[derive(Clone)]
pub struct HarvestMCPFactory {
    tool_router: ToolRouter<Self>,
    client: HarvestClient,
    config: Arc<Config>,
    clock: Clock,
}

/// Logs a tool failure before it is handed to the MCP framework.
fn reported<T>(tool: &str, result: Result<T, ErrorData>) -> Result<T, ErrorData> {
    if let Err(e) = &result {
        error!(tool, code = e.code.0, message = %e.message, "tool call failed");
    }
    result
}

#[tool_router]
impl HarvestMCPFactory {
    /// Builds the server with the local wall clock.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built from the configured credentials.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        Self::with_clock(config, Arc::new(Local::now))
    }

    /// Builds the server with an explicit clock.
    ///
    /// # Errors
    /// Same as [`HarvestMCPFactory::new`].
    pub fn with_clock(config: Config, clock: Clock) -> Result<Self, HarvestError> {
        let client = HarvestClient::new(&config)?;
        Ok(Self {
            tool_router: Self::tool_router(),
            client,
            config: Arc::new(config),
            clock,
        })
    }

    // Thin delegating methods so the `tool_router` proc-macro (which scans
    // this impl block) can discover and register the tools. These forward to
    // the implementations in `mcp::tools::*`.

    #[tool(description = "Log time entry using natural language")]
    async fn log_time(
        &self,
        params: Parameters<LogTimeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "log_time", text = %params.0.text, "tool called");
        reported(
            "log_time",
            log_time::log_time(&self.client, &self.config, (self.clock)(), params).await,
        )
    }

    #[tool(description = "List available Harvest projects")]
    async fn list_projects(&self) -> Result<CallToolResult, ErrorData> {
        info!(tool = "list_projects", "tool called");
        reported("list_projects", projects::list_projects(&self.client).await)
    }

    #[tool(description = "List available tasks for a project")]
    async fn list_tasks(
        &self,
        params: Parameters<ListTasksRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "list_tasks", project_id = params.0.project_id, "tool called");
        reported("list_tasks", tasks::list_tasks(&self.client, params).await)
    }

    #[tool(description = "List recent time entries")]
    async fn list_entries(
        &self,
        params: Parameters<ListEntriesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "list_entries", from = ?params.0.from, to = ?params.0.to, "tool called");
        reported("list_entries", entries::list_entries(&self.client, params).await)
    }

    #[tool(description = "Get time reports using natural language")]
    async fn get_time_report(
        &self,
        params: Parameters<TimeReportRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "get_time_report", text = %params.0.text, "tool called");
        reported(
            "get_time_report",
            time_report::get_time_report(&self.client, (self.clock)(), params).await,
        )
    }
}

#[tool_handler]
impl ServerHandler for HarvestMCPFactory {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Harvest".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Harvest time tracking MCP Server. Log time and leave with natural language \
                 (\"2 hours on Acme Redesign today\", \"sick today\") and ask for reports \
                 (\"time by client for last month\")."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, ErrorData> {
        info!(
            client = %request.client_info.name,
            client_version = %request.client_info.version,
            timezone = %self.config.timezone,
            "initialize from mcp client"
        );
        Ok(self.get_info())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use chrono::TimeZone;
    use rmcp::model::{ErrorCode, RawContent};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: String) -> Config {
        Config {
            access_token: "token".to_string(),
            account_id: "424242".to_string(),
            standard_work_day_hours: 7.5,
            timezone: "Australia/Perth".to_string(),
            base_url,
        }
    }

    // 2025-03-15 is a Saturday.
    fn server(base_url: String) -> HarvestMCPFactory {
        let fixed = Local
            .with_ymd_and_hms(2025, 3, 15, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        HarvestMCPFactory::with_clock(test_config(base_url), Arc::new(move || fixed))
            .expect("server")
    }

    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn extract_json(result: &CallToolResult) -> Value {
        serde_json::from_str(extract_text(result).expect("text content")).expect("valid json")
    }

    async fn mount_catalog(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    { "id": 1, "name": "Acme Redesign", "code": "ACME", "is_active": true },
                    { "id": 9, "name": "[LV] Leave", "code": "LV", "is_active": true }
                ]
            })))
            .mount(mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/projects/1/task_assignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_assignments": [
                    { "id": 300, "task": { "id": 31, "name": "Design" } },
                    { "id": 301, "task": { "id": 32, "name": "Development" } }
                ]
            })))
            .mount(mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/projects/9/task_assignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_assignments": [
                    { "id": 900, "task": { "id": 76, "name": "Person (Sick/Carer's) Leave" } },
                    { "id": 901, "task": { "id": 77, "name": "Annual Leave" } }
                ]
            })))
            .mount(mock_server)
            .await;
    }

    async fn expect_entry(mock_server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/time_entries"))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1001 })))
            .expect(1)
            .mount(mock_server)
            .await;
    }

    fn text(s: &str) -> Parameters<LogTimeRequest> {
        Parameters(LogTimeRequest {
            text: s.to_string(),
        })
    }

    fn query(s: &str) -> Parameters<TimeReportRequest> {
        Parameters(TimeReportRequest {
            text: s.to_string(),
        })
    }

    #[test]
    fn exposes_the_five_tools() {
        let mut names: Vec<String> = HarvestMCPFactory::tool_router()
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["get_time_report", "list_entries", "list_projects", "list_tasks", "log_time"]
        );
    }

    #[test]
    fn text_tools_require_text() {
        let tools = HarvestMCPFactory::tool_router().list_all();
        for name in ["log_time", "get_time_report"] {
            let tool = tools.iter().find(|t| t.name == name).expect("tool");
            let schema = serde_json::to_value(tool.input_schema.as_ref()).unwrap();
            assert_eq!(schema["properties"]["text"]["type"], "string", "{name}");
            assert_eq!(schema["required"], json!(["text"]), "{name}");
        }

        let list_tasks = tools.iter().find(|t| t.name == "list_tasks").expect("tool");
        let schema = serde_json::to_value(list_tasks.input_schema.as_ref()).unwrap();
        assert_eq!(schema["required"], json!(["project_id"]));
    }

    #[test]
    fn server_info_advertises_tools() {
        let server = server("http://127.0.0.1:9".to_string());
        let info = ServerHandler::get_info(&server);
        assert_eq!(info.server_info.name, "harvest-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.expect("instructions").contains("Harvest"));
    }

    #[tokio::test]
    async fn logs_regular_work_against_named_project() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;
        let notes = "2 hours on Acme Redesign doing dev work today";
        expect_entry(
            &mock_server,
            json!({
                "project_id": 1,
                "task_id": 31,
                "spent_date": "2025-03-15",
                "hours": 2.0,
                "notes": notes,
            }),
        )
        .await;

        let result = server(mock_server.uri()).log_time(text(notes)).await.unwrap();
        assert_eq!(extract_json(&result)["id"], 1001);
    }

    #[tokio::test]
    async fn project_numbers_do_not_shift_the_spent_date() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [{ "id": 3, "name": "Phase 2", "code": null, "is_active": true }]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/3/task_assignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_assignments": [{ "id": 500, "task": { "id": 5, "name": "Build" } }]
            })))
            .mount(&mock_server)
            .await;
        expect_entry(
            &mock_server,
            json!({
                "project_id": 3,
                "task_id": 5,
                "spent_date": "2025-03-16",
                "hours": 1.0,
                "notes": "1h on Phase 2 tomorrow",
            }),
        )
        .await;

        server(mock_server.uri())
            .log_time(text("1h on Phase 2 tomorrow"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn logs_sick_leave_as_a_full_day() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;
        expect_entry(
            &mock_server,
            json!({
                "project_id": 9,
                "task_id": 76,
                "spent_date": "2025-03-15",
                "hours": 7.5,
                "notes": "sick today",
            }),
        )
        .await;

        server(mock_server.uri()).log_time(text("sick today")).await.unwrap();
    }

    #[tokio::test]
    async fn logs_annual_leave_for_tomorrow() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;
        expect_entry(
            &mock_server,
            json!({
                "project_id": 9,
                "task_id": 77,
                "spent_date": "2025-03-16",
                "hours": 7.5,
                "notes": "annual leave tomorrow",
            }),
        )
        .await;

        server(mock_server.uri())
            .log_time(text("annual leave tomorrow"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_project_is_invalid_params() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;

        let err = server(mock_server.uri())
            .log_time(text("30 minutes on nothing"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Could not find matching project");
    }

    #[tokio::test]
    async fn missing_duration_fails_without_calling_harvest() {
        let mock_server = MockServer::start().await;

        let err = server(mock_server.uri())
            .log_time(text("worked on Acme Redesign today"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn harvest_failure_is_internal_error() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/time_entries"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "message": "Project is archived" })),
            )
            .mount(&mock_server)
            .await;

        let err = server(mock_server.uri())
            .log_time(text("1h on Acme Redesign today"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message, "Harvest API error: Project is archived");
    }

    #[tokio::test]
    async fn last_week_report_defaults_to_projects() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/time/projects"))
            .and(query_param("from", "2025-03-02"))
            .and(query_param("to", "2025-03-08"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "project_id": 1, "project_name": "Acme Redesign", "total_hours": 12.5 }],
                "per_page": 2000,
                "total_pages": 1,
                "total_entries": 1,
                "next_page": null,
                "previous_page": null,
                "page": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = server(mock_server.uri())
            .get_time_report(query("Show time report for last week"))
            .await
            .unwrap();
        assert_eq!(extract_json(&result)["results"][0]["total_hours"], 12.5);
    }

    #[tokio::test]
    async fn client_report_for_this_month() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/time/clients"))
            .and(query_param("from", "2025-03-01"))
            .and(query_param("to", "2025-03-15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        server(mock_server.uri())
            .get_time_report(query("breakdown by client for this month"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unparseable_report_query_is_invalid_params() {
        let mock_server = MockServer::start().await;
        let err = server(mock_server.uri())
            .get_time_report(query("show me everything"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn lists_projects_with_projected_fields() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;

        let result = server(mock_server.uri()).list_projects().await.unwrap();
        assert_eq!(
            extract_json(&result),
            json!([
                { "id": 1, "name": "Acme Redesign", "code": "ACME", "is_active": true },
                { "id": 9, "name": "[LV] Leave", "code": "LV", "is_active": true }
            ])
        );
    }

    #[tokio::test]
    async fn lists_tasks_for_a_project() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;

        let result = server(mock_server.uri())
            .list_tasks(Parameters(ListTasksRequest { project_id: 9 }))
            .await
            .unwrap();
        assert_eq!(
            extract_json(&result),
            json!([
                { "id": 76, "name": "Person (Sick/Carer's) Leave" },
                { "id": 77, "name": "Annual Leave" }
            ])
        );
    }

    #[tokio::test]
    async fn lists_entries_in_a_window() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_entries"))
            .and(query_param("from", "2025-03-01"))
            .and(query_param("to", "2025-03-15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "time_entries": [{
                    "id": 1001,
                    "spent_date": "2025-03-14",
                    "hours": 2.0,
                    "notes": "dev work",
                    "is_locked": false,
                    "project": { "id": 1, "name": "Acme Redesign" },
                    "task": { "id": 32, "name": "Development" }
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = server(mock_server.uri())
            .list_entries(Parameters(ListEntriesRequest {
                from: Some("2025-03-01".to_string()),
                to: Some("2025-03-15".to_string()),
            }))
            .await
            .unwrap();
        assert_eq!(
            extract_json(&result),
            json!([{
                "id": 1001,
                "spent_date": "2025-03-14",
                "hours": 2.0,
                "notes": "dev work",
                "project": "Acme Redesign",
                "task": "Development"
            }])
        );
    }

    #[tokio::test]
    async fn list_entries_forwards_trimmed_dates_and_skips_blank_ones() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_entries"))
            .and(query_param("from", "March 1st"))
            .and(query_param_is_missing("to"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "time_entries": [] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = server(mock_server.uri())
            .list_entries(Parameters(ListEntriesRequest {
                from: Some("  March 1st ".to_string()),
                to: Some("   ".to_string()),
            }))
            .await
            .unwrap();
        assert_eq!(extract_json(&result), json!([]));
    }
}
