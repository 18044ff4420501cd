use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rmcp::{ServiceExt, transport::stdio};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod mcp;
mod setup;

use mcp::{HarvestMCPFactory, config::Config, error::HarvestError};

#[derive(Parser)]
#[command(name = "harvest-mcp-server", version)]
#[command(about = "Harvest MCP Server with natural language time tracking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Harvest MCP server on stdio (default)
    Start,
    /// Configure the Harvest MCP server in the assistant's config files
    Setup,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load variables from .env file if it exists into the environment
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Setup) => {
            setup::run()?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Start) | None => start().await,
    }
}

async fn start() -> Result<ExitCode> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(HarvestError::MissingConfig(_)) => {
            eprintln!(
                "Error: HARVEST_ACCESS_TOKEN and HARVEST_ACCOUNT_ID environment variables are required"
            );
            eprintln!("Run \"harvest-mcp-server setup\" to configure");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(
        account_id = %config.account_id,
        work_day_hours = config.standard_work_day_hours,
        timezone = %config.timezone,
        "Starting Harvest MCP server on stdio"
    );

    let service = HarvestMCPFactory::new(config)?
        .serve(stdio())
        .await
        .inspect_err(|e| error!("failed to start mcp service: {e}"))?;

    // Shut the transport down cleanly on CTRL+C
    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("received CTRL+C, shutting down");
                cancel.cancel();
            }
            Err(e) => error!("failed to install CTRL+C handler: {e}"),
        }
    });

    let quit_reason = service.waiting().await?;
    info!(?quit_reason, "Harvest MCP server stopped");

    Ok(ExitCode::SUCCESS)
}
