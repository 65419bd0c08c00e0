//! HTTP client initialization.
//!
//! This module provides functions to initialize the HTTP clients used for
//! liveness checks and for the certificate transparency lookup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{RunConfig, HTTP_TIMEOUT_SECS};

/// Initializes the HTTP client used by the probe.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the run configuration
/// - Per-attempt timeout of `HTTP_TIMEOUT_SECS`
/// - Redirects disabled (the probe follows them itself to record the chain)
/// - Rustls TLS backend
///
/// Certificates are verified; a TLS failure is a connection-level failure and
/// makes the probe fall back to plain HTTP.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(config: &RunConfig) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client used for passive lookups during discovery.
///
/// No overall timeout is set here; callers bound each request by the time left
/// in the run.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_discovery_client(config: &RunConfig) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
