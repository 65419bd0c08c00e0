//! HTTPS/HTTP liveness check.
//!
//! HTTPS is tried first; any failure short of a protocol violation moves on to
//! plain HTTP. Redirects are followed by hand, up to `MAX_REDIRECT_HOPS`, so
//! the whole chain can be reported.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use url::Url;

use crate::config::MAX_REDIRECT_HOPS;
use crate::error_handling::{categorize_reqwest_error, ProbeEvent, ProbeStats};

use super::{HttpCheck, HttpOutcome, Scheme};

/// [`HttpCheck`] backed by a `reqwest` client with redirects disabled.
pub struct ReqwestCheck {
    client: Arc<reqwest::Client>,
    stats: Arc<ProbeStats>,
    https_port: u16,
    http_port: u16,
}

/// The last response seen while walking a redirect chain.
struct Landing {
    status: StatusCode,
    url: Url,
    server: Option<String>,
}

impl ReqwestCheck {
    /// Check against the standard ports 443 and 80.
    pub fn new(client: Arc<reqwest::Client>, stats: Arc<ProbeStats>) -> Self {
        Self::with_ports(client, stats, 443, 80)
    }

    /// Uses non-standard ports, for local test servers.
    pub fn with_ports(
        client: Arc<reqwest::Client>,
        stats: Arc<ProbeStats>,
        https_port: u16,
        http_port: u16,
    ) -> Self {
        Self {
            client,
            stats,
            https_port,
            http_port,
        }
    }

    fn start_url(&self, scheme: Scheme, hostname: &str) -> String {
        let (port, default) = match scheme {
            Scheme::Https => (self.https_port, 443),
            Scheme::Http => (self.http_port, 80),
        };
        if port == default {
            format!("{scheme}://{hostname}/")
        } else {
            format!("{scheme}://{hostname}:{port}/")
        }
    }

    /// Requests `start` and follows redirects.
    ///
    /// Returns the final landing and the chain of requested URLs, or the error
    /// outcome if no response at all was obtained or the chain was invalid.
    async fn follow(&self, scheme: Scheme, start: &str) -> Result<(Landing, Vec<String>), Attempt> {
        let mut chain = Vec::new();
        let mut current = Url::parse(start).map_err(|e| Attempt::Unreachable(e.to_string()))?;
        let mut landing: Option<Landing> = None;

        for _ in 0..=MAX_REDIRECT_HOPS {
            chain.push(current.to_string());
            let response = match self.client.get(current.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    let kind = categorize_reqwest_error(&e);
                    self.stats.increment(kind.event());
                    // A later hop failing does not undo the earlier answer.
                    if let Some(landing) = landing {
                        debug!("Redirect target {} failed: {}", current, e);
                        return Ok((landing, chain));
                    }
                    return Err(if kind.is_protocol_violation() {
                        Attempt::Protocol(e.to_string())
                    } else {
                        Attempt::Unreachable(format!("{scheme}: {e}"))
                    });
                }
            };

            let status = response.status();
            let server = response
                .headers()
                .get(reqwest::header::SERVER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            landing = Some(Landing {
                status,
                url: current.clone(),
                server,
            });

            if !status.is_redirection() {
                break;
            }
            let Some(location) = location else {
                debug!("Redirect status {} for {} without Location", status, current);
                break;
            };
            current = match current.join(&location) {
                Ok(next) => next,
                Err(e) => {
                    self.stats.increment(ProbeEvent::HttpProtocolError);
                    return Err(Attempt::Protocol(format!(
                        "invalid redirect Location '{location}': {e}"
                    )));
                }
            };

            // The last redirect answered is the landing once the hop limit is hit.
            if chain.len() > MAX_REDIRECT_HOPS {
                debug!(
                    "Stopped following redirects from {} after {} hops",
                    start, MAX_REDIRECT_HOPS
                );
                break;
            }
        }

        match landing {
            Some(landing) => Ok((landing, chain)),
            None => Err(Attempt::Unreachable(format!("{scheme}: no response"))),
        }
    }
}

enum Attempt {
    Unreachable(String),
    Protocol(String),
}

#[async_trait]
impl HttpCheck for ReqwestCheck {
    async fn check(&self, hostname: &str) -> HttpOutcome {
        let mut failures = Vec::new();

        for scheme in [Scheme::Https, Scheme::Http] {
            let start = self.start_url(scheme, hostname);
            match self.follow(scheme, &start).await {
                Ok((landing, redirect_chain)) => {
                    let status_code = landing.status.as_u16();
                    if !(100..=599).contains(&status_code) {
                        self.stats.increment(ProbeEvent::HttpProtocolError);
                        return HttpOutcome::ProtocolError {
                            scheme,
                            reason: format!("status code {status_code} out of range"),
                        };
                    }
                    self.stats.increment(match scheme {
                        Scheme::Https => ProbeEvent::HttpsResponded,
                        Scheme::Http => ProbeEvent::HttpResponded,
                    });
                    return HttpOutcome::Responded {
                        scheme,
                        status_code,
                        final_url: landing.url.to_string(),
                        redirect_chain,
                        server: landing.server,
                    };
                }
                Err(Attempt::Protocol(reason)) => {
                    return HttpOutcome::ProtocolError { scheme, reason };
                }
                Err(Attempt::Unreachable(reason)) => {
                    debug!("{} unreachable over {}: {}", hostname, scheme, reason);
                    failures.push(reason);
                }
            }
        }

        HttpOutcome::Unreachable {
            reason: failures.join("; "),
        }
    }
}
