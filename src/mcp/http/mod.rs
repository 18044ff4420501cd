//! HTTP client and API communication layer for Harvest.
//!
//! This module handles all HTTP communication with the Harvest v2 REST API,
//! including authentication headers, request construction, and error bodies.

mod client;

pub use client::HarvestClient;
