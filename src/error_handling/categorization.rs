//! Error categorization.
//!
//! This module maps `reqwest` errors onto the coarse failure kinds the probe
//! cares about, chiefly whether the next scheme should be tried.

use super::types::ProbeEvent;

/// Why an HTTP attempt produced no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpFailureKind {
    /// The request timed out
    Timeout,
    /// TCP connect failed (refused, unreachable, name not resolvable)
    Connect,
    /// TLS handshake or certificate failure
    Tls,
    /// Redirect limit exceeded or redirect loop
    Redirect,
    /// The server answered with something that is not valid HTTP
    Protocol,
    /// Anything else (request construction, unknown)
    Other,
}

impl HttpFailureKind {
    /// The server answered, but not with usable HTTP. Every other kind makes
    /// the probe fall back to the next scheme.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, HttpFailureKind::Protocol | HttpFailureKind::Redirect)
    }

    /// The statistics event recorded for this failure.
    pub fn event(&self) -> ProbeEvent {
        match self {
            HttpFailureKind::Timeout => ProbeEvent::HttpTimeout,
            HttpFailureKind::Connect => ProbeEvent::HttpConnectFailure,
            HttpFailureKind::Tls => ProbeEvent::HttpTlsFailure,
            HttpFailureKind::Redirect | HttpFailureKind::Protocol | HttpFailureKind::Other => {
                ProbeEvent::HttpProtocolError
            }
        }
    }
}

/// Returns true if any error in the chain mentions TLS or certificates.
fn chain_mentions_tls(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = current {
        let msg = err.to_string().to_lowercase();
        if msg.contains("certificate")
            || msg.contains("tls")
            || msg.contains("handshake")
            || msg.contains("ssl")
        {
            return true;
        }
        current = err.source();
    }
    false
}

/// Categorizes a `reqwest::Error` into an `HttpFailureKind`.
///
/// TLS problems surface from `reqwest` as connect errors, so the source chain
/// is inspected to tell them apart from plain connection failures.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> HttpFailureKind {
    if error.is_timeout() {
        HttpFailureKind::Timeout
    } else if error.is_connect() {
        if chain_mentions_tls(error) {
            HttpFailureKind::Tls
        } else {
            HttpFailureKind::Connect
        }
    } else if error.is_redirect() {
        HttpFailureKind::Redirect
    } else if error.is_request() || error.is_body() || error.is_decode() {
        if chain_mentions_tls(error) {
            HttpFailureKind::Tls
        } else {
            HttpFailureKind::Protocol
        }
    } else {
        HttpFailureKind::Other
    }
}
