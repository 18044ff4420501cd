//! HTTP client and shared API call functionality for Harvest.
//!
//! This module provides:
//! - A client built once per process with the Harvest auth headers baked in
//! - Tracing integration for every outbound request
//! - Translation of Harvest error bodies into `HarvestError::Api`

use http::Extensions;
use reqwest::{
    Method, Request, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Result as MiddlewareResult};
use reqwest_tracing::{
    ReqwestOtelSpanBackend, TracingMiddleware, default_on_request_end, reqwest_otel_span,
};
use serde_json::Value;
use tracing::{Span, debug};

use crate::mcp::{config::Config, error::HarvestError};

const ACCOUNT_ID_HEADER: &str = "Harvest-Account-Id";

// Used through TracingMiddleware<HarvestTracing>, which the compiler can't see.
#[allow(dead_code)]
struct HarvestTracing;

impl ReqwestOtelSpanBackend for HarvestTracing {
    fn on_request_start(req: &Request, _extension: &mut Extensions) -> Span {
        // Headers are not recorded: they carry the bearer token.
        reqwest_otel_span!(
            name = "harvest-api-request",
            req,
            request_body = req.body().and_then(|b| b.as_bytes()).map(String::from_utf8_lossy).as_deref(),
        )
    }

    fn on_request_end(
        span: &Span,
        outcome: &MiddlewareResult<Response>,
        _extension: &mut Extensions,
    ) {
        default_on_request_end(span, outcome);
    }
}

/// Authenticated client for the Harvest v2 REST API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HarvestClient {
    http: ClientWithMiddleware,
    base_url: String,
}

impl HarvestClient {
    /// Builds the client with `Authorization`, `Harvest-Account-Id` and
    /// `User-Agent` set on every request.
    ///
    /// # Errors
    /// `InvalidConfig` if a credential contains bytes that are not valid in a
    /// header, `Http` if the TLS backend fails to initialise.
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|e| HarvestError::InvalidConfig(format!("HARVEST_ACCESS_TOKEN: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        headers.insert(
            ACCOUNT_ID_HEADER,
            HeaderValue::from_str(&config.account_id)
                .map_err(|e| HarvestError::InvalidConfig(format!("HARVEST_ACCOUNT_ID: {e}")))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder().default_headers(headers).build()?;
        let http = ClientBuilder::new(inner)
            .with(TracingMiddleware::<HarvestTracing>::new())
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}{path}` with the given query pairs.
    ///
    /// # Errors
    /// `Api` for non-2xx responses, `Http`/`HttpMiddleware` for transport failures.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, HarvestError> {
        self.call(Method::GET, path, query, None).await
    }

    /// `POST {base}{path}` with a JSON body.
    ///
    /// # Errors
    /// Same as [`HarvestClient::get`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, HarvestError> {
        self.call(Method::POST, path, &[], Some(body)).await
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, HarvestError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, ?query, "calling harvest");

        let mut request_builder = match method {
            Method::GET => self.http.get(&url),
            Method::POST => self.http.post(&url),
            _ => {
                return Err(HarvestError::invalid_input(format!(
                    "Unsupported HTTP method {method}"
                )));
            }
        };

        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let bytes = response.bytes().await?;
            let message = error_message(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(HarvestError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

/// Pulls a human message out of a Harvest error body.
fn error_message(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    ["message", "error_description", "error"]
        .iter()
        .find_map(|key| json[*key].as_str())
        .map(str::to_string)
}
