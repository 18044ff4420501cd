//! Interactive `setup` command.
//!
//! Prompts for Harvest credentials and work-day settings, then merges a
//! `harvest-server` entry into the MCP config of the Claude desktop app and,
//! when present, the Cline VS Code extension.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value, json};

use crate::mcp::config::{DEFAULT_TIMEZONE, DEFAULT_WORK_DAY_HOURS};

const SERVER_NAME: &str = "harvest-server";
const DESKTOP_CONFIG: &str = "Claude/claude_desktop_config.json";
const CLINE_CONFIG: &str =
    "Code/User/globalStorage/saoudrizwan.claude-dev/settings/cline_mcp_settings.json";

/// Answers collected by the setup prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAnswers {
    pub access_token: String,
    pub account_id: String,
    pub work_day_hours: String,
    pub timezone: String,
}

impl SetupAnswers {
    /// The `mcpServers` entry that launches this binary with the answers as env.
    pub fn server_entry(&self) -> Value {
        json!({
            "command": env!("CARGO_PKG_NAME"),
            "args": [],
            "env": {
                "HARVEST_ACCESS_TOKEN": self.access_token,
                "HARVEST_ACCOUNT_ID": self.account_id,
                "STANDARD_WORK_DAY_HOURS": self.work_day_hours,
                "TIMEZONE": self.timezone,
            },
            "disabled": false,
            "autoApprove": [],
        })
    }
}

/// Returns `existing` with `mcpServers.<name>` replaced by `entry`, keeping
/// every other key and server.
pub fn merge_server_entry(existing: Value, name: &str, entry: Value) -> Value {
    let mut root = match existing {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let servers = root
        .entry("mcpServers")
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        *servers = Value::Object(Map::new());
    }
    if let Value::Object(servers) = servers {
        servers.insert(name.to_string(), entry);
    }

    Value::Object(root)
}

/// Reads `path` (an absent file counts as `{}`), merges the entry and writes it back.
///
/// # Errors
/// Fails when the file holds invalid JSON or cannot be written.
pub fn write_server_entry(path: &Path, entry: &Value) -> Result<()> {
    let existing = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str::<Value>(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?
    } else {
        Value::Object(Map::new())
    };

    let merged = merge_server_entry(existing, SERVER_NAME, entry.clone());
    fs::write(path, serde_json::to_string_pretty(&merged)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn config_path(relative: &str) -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(relative))
        .ok_or_else(|| anyhow!("could not determine the user config directory"))
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn or_default(answer: String, default: &str) -> String {
    if answer.is_empty() {
        default.to_string()
    } else {
        answer
    }
}

fn ask(input: &mut impl BufRead) -> Result<SetupAnswers> {
    println!("\nHarvest MCP Server Setup\n");
    println!("First, we need your Harvest credentials.");
    println!("You can find these at: https://id.getharvest.com/developers\n");

    let access_token = prompt(input, "Personal Access Token: ")?;
    let account_id = prompt(input, "Account ID: ")?;

    println!("\nNow, let's configure your work day settings.\n");

    let work_day_hours = or_default(
        prompt(
            input,
            &format!("Standard work day hours (default: {DEFAULT_WORK_DAY_HOURS}): "),
        )?,
        &DEFAULT_WORK_DAY_HOURS.to_string(),
    );
    let timezone = or_default(
        prompt(input, &format!("Timezone (default: {DEFAULT_TIMEZONE}): "))?,
        DEFAULT_TIMEZONE,
    );

    Ok(SetupAnswers {
        access_token,
        account_id,
        work_day_hours,
        timezone,
    })
}

/// Runs the interactive setup against stdin/stdout.
///
/// # Errors
/// Fails on stdin/stdout errors or when no config directory exists. Failures
/// to write an assistant config are reported, not returned.
pub fn run() -> Result<()> {
    let stdin = io::stdin();
    let answers = ask(&mut stdin.lock())?;
    let entry = answers.server_entry();

    let desktop = config_path(DESKTOP_CONFIG)?;
    match write_server_entry(&desktop, &entry) {
        Ok(()) => println!("\nClaude desktop app configured successfully"),
        Err(e) => {
            println!("\nCould not configure Claude desktop app: {e:#}");
            println!("You may need to add this configuration manually to:");
            println!("{}", desktop.display());
            println!("\nConfiguration to add:");
            let block = json!({ "mcpServers": { SERVER_NAME: entry.clone() } });
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
    }

    // The VS Code extension is optional: only touch an existing file, stay quiet on failure.
    let cline = config_path(CLINE_CONFIG)?;
    if cline.exists() && write_server_entry(&cline, &entry).is_ok() {
        println!("VSCode extension configured successfully");
    }

    println!("\nSetup complete!");
    println!("\nPlease:");
    println!("1. Restart the Claude desktop app");
    println!("2. Try a test command like: \"Show time report for this week\"\n");

    Ok(())
}
