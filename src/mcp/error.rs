//! Error types for the Harvest MCP implementation.
//!
//! This module contains the custom error type and conversions needed for the
//! Harvest bridge. It provides:
//! - `HarvestError`: parser, configuration and transport failures
//! - Conversions from `reqwest`, `reqwest_middleware` and `serde_json` errors
//! - Conversion to RMCP's `ErrorData` for MCP protocol compliance

use reqwest::StatusCode;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Harvest API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarvestError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<HarvestError> for ErrorData {
    fn from(err: HarvestError) -> Self {
        match err {
            HarvestError::InvalidInput(msg) => Self::new(ErrorCode::INVALID_PARAMS, msg, None),
            HarvestError::MissingConfig(_) | HarvestError::InvalidConfig(_) => {
                Self::new(ErrorCode::INTERNAL_ERROR, err.to_string(), None)
            }
            HarvestError::Api { message, .. } => Self::new(
                ErrorCode::INTERNAL_ERROR,
                format!("Harvest API error: {message}"),
                None,
            ),
            HarvestError::Http(e) => Self::new(
                ErrorCode::INTERNAL_ERROR,
                format!("Harvest API error: {e}"),
                None,
            ),
            HarvestError::HttpMiddleware(e) => Self::new(
                ErrorCode::INTERNAL_ERROR,
                format!("Harvest API error: {e}"),
                None,
            ),
            HarvestError::Serialization(e) => {
                Self::new(ErrorCode::INTERNAL_ERROR, e.to_string(), None)
            }
        }
    }
}
