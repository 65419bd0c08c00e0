//! Liveness probing of a single hostname.
//!
//! A probe performs two independently bounded checks:
//! - DNS resolution of address records
//! - An HTTPS request, falling back to plain HTTP on connection-level failures
//!
//! The outcomes are combined into a [`Classification`]. Both checks sit behind
//! traits so the pool and the run controller can be exercised against a
//! deterministic, in-memory network.

mod dns;
mod http;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use tokio::time::{timeout, Instant};

use crate::config::{DNS_TIMEOUT_SECS, PROBE_CEILING};
use crate::error_handling::{ProbeEvent, ProbeStats};

pub use dns::HickoryLookup;
pub use http::ReqwestCheck;

/// What DNS said about a hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DnsOutcome {
    /// At least one A/AAAA record
    Resolved {
        /// Distinct addresses in answer order
        addresses: Vec<IpAddr>,
    },
    /// NXDOMAIN
    NoSuchName,
    /// Timeout, SERVFAIL, no address records, or anything else
    Failed {
        /// Resolver error text
        reason: String,
    },
}

impl DnsOutcome {
    fn event(&self) -> ProbeEvent {
        match self {
            DnsOutcome::Resolved { .. } => ProbeEvent::DnsResolved,
            DnsOutcome::NoSuchName => ProbeEvent::DnsNoSuchName,
            DnsOutcome::Failed { reason } if reason.contains("timed out") => ProbeEvent::DnsTimeout,
            DnsOutcome::Failed { .. } => ProbeEvent::DnsFailure,
        }
    }

    /// First resolved address, if any.
    pub fn first_address(&self) -> Option<IpAddr> {
        match self {
            DnsOutcome::Resolved { addresses } => addresses.first().copied(),
            _ => None,
        }
    }
}

/// URL scheme of an HTTP attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// TLS, tried first
    Https,
    /// Plaintext fallback
    Http,
}

impl Scheme {
    /// Lowercase scheme name as used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the HTTP check observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HttpOutcome {
    /// A valid HTTP response (any status from 100 to 599)
    Responded {
        /// Scheme that answered
        scheme: Scheme,
        /// Status of the last response
        status_code: u16,
        /// URL of the last response after following redirects
        final_url: String,
        /// Every URL requested, starting with the initial one
        redirect_chain: Vec<String>,
        /// `Server` response header
        server: Option<String>,
    },
    /// Neither scheme could be reached
    Unreachable {
        /// Failure of each attempt, joined with `; `
        reason: String,
    },
    /// The server answered, but not with usable HTTP
    ProtocolError {
        /// Scheme whose answer was unusable
        scheme: Scheme,
        /// What was wrong with it
        reason: String,
    },
    /// Not attempted because DNS reported no such name
    Skipped,
}

impl HttpOutcome {
    /// Final status code when the host responded.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpOutcome::Responded { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Liveness verdict for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Resolved in DNS or answered over HTTP(S)
    Active,
    /// Neither resolved nor answered
    Inactive,
    /// Answered with something that is not valid HTTP
    Error,
}

impl Classification {
    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Active => "active",
            Classification::Inactive => "inactive",
            Classification::Error => "error",
        }
    }
}

/// Outcome of probing one candidate. Created once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Candidate hostname that was probed
    pub hostname: String,
    /// Verdict derived from `dns` and `http`
    pub classification: Classification,
    /// DNS lookup outcome
    pub dns: DnsOutcome,
    /// HTTP(S) check outcome
    pub http: HttpOutcome,
    /// Wall time of the whole probe
    pub elapsed_ms: u64,
}

/// Resolves a hostname's address records.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Never fails; every error is folded into the outcome.
    async fn lookup(&self, hostname: &str) -> DnsOutcome;
}

/// Checks whether a hostname answers HTTP(S).
#[async_trait]
pub trait HttpCheck: Send + Sync {
    /// Tries HTTPS, then HTTP.
    async fn check(&self, hostname: &str) -> HttpOutcome;
}

/// Probes one hostname end to end. Implementations must not panic on
/// network failures; every failure is expressed in the returned result.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `hostname` and classifies it.
    async fn probe(&self, hostname: &str) -> ProbeResult;
}

/// Combines DNS and HTTP outcomes into a classification.
///
/// A response over HTTP(S) or at least one resolved address is `Active`.
/// Otherwise a protocol-level failure is `Error`, and everything else is
/// `Inactive`.
pub fn classify(dns: &DnsOutcome, http: &HttpOutcome) -> Classification {
    let responded = matches!(http, HttpOutcome::Responded { .. });
    let resolved = matches!(dns, DnsOutcome::Resolved { addresses } if !addresses.is_empty());

    if responded || resolved {
        Classification::Active
    } else if matches!(http, HttpOutcome::ProtocolError { .. }) {
        Classification::Error
    } else {
        Classification::Inactive
    }
}

/// The production prober: a DNS lookup and an HTTP check under timeouts.
pub struct NetworkProber {
    dns: Arc<dyn DnsLookup>,
    http: Arc<dyn HttpCheck>,
    stats: Arc<ProbeStats>,
    dns_timeout: Duration,
    ceiling: Duration,
}

impl NetworkProber {
    /// Prober with the default DNS timeout and probe ceiling.
    pub fn new(dns: Arc<dyn DnsLookup>, http: Arc<dyn HttpCheck>, stats: Arc<ProbeStats>) -> Self {
        Self {
            dns,
            http,
            stats,
            dns_timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
            ceiling: PROBE_CEILING,
        }
    }

    /// Overrides the DNS timeout and the whole-probe ceiling.
    pub fn with_timeouts(mut self, dns_timeout: Duration, ceiling: Duration) -> Self {
        self.dns_timeout = dns_timeout;
        self.ceiling = ceiling;
        self
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, hostname: &str) -> ProbeResult {
        let started = Instant::now();

        let dns = match timeout(self.dns_timeout, self.dns.lookup(hostname)).await {
            Ok(outcome) => outcome,
            Err(_) => DnsOutcome::Failed {
                reason: format!("DNS lookup timed out after {:?}", self.dns_timeout),
            },
        };
        self.stats.increment(dns.event());

        let http = if dns == DnsOutcome::NoSuchName {
            HttpOutcome::Skipped
        } else {
            let remaining = self.ceiling.saturating_sub(started.elapsed());
            match timeout(remaining, self.http.check(hostname)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.stats.increment(ProbeEvent::ProbeCeilingExceeded);
                    HttpOutcome::Unreachable {
                        reason: format!("probe ceiling of {:?} exceeded", self.ceiling),
                    }
                }
            }
        };

        let classification = classify(&dns, &http);
        debug!("{} classified {}", hostname, classification.as_str());

        ProbeResult {
            hostname: hostname.to_string(),
            classification,
            dns,
            http,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDns(HashMap<&'static str, DnsOutcome>);

    #[async_trait]
    impl DnsLookup for StaticDns {
        async fn lookup(&self, hostname: &str) -> DnsOutcome {
            self.0.get(hostname).cloned().unwrap_or(DnsOutcome::NoSuchName)
        }
    }

    struct HangingDns;

    #[async_trait]
    impl DnsLookup for HangingDns {
        async fn lookup(&self, _hostname: &str) -> DnsOutcome {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct CountingHttp {
        calls: AtomicUsize,
        hang: bool,
    }

    #[async_trait]
    impl HttpCheck for CountingHttp {
        async fn check(&self, hostname: &str) -> HttpOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            HttpOutcome::Responded {
                scheme: Scheme::Https,
                status_code: 200,
                final_url: format!("https://{hostname}/"),
                redirect_chain: vec![format!("https://{hostname}/")],
                server: None,
            }
        }
    }

    fn resolved() -> DnsOutcome {
        DnsOutcome::Resolved {
            addresses: vec!["192.0.2.1".parse().unwrap()],
        }
    }

    #[test]
    fn test_classify_matrix() {
        let responded = HttpOutcome::Responded {
            scheme: Scheme::Http,
            status_code: 503,
            final_url: "http://a.example.com/".into(),
            redirect_chain: vec![],
            server: None,
        };
        let unreachable = HttpOutcome::Unreachable { reason: "refused".into() };
        let protocol = HttpOutcome::ProtocolError {
            scheme: Scheme::Https,
            reason: "invalid header".into(),
        };
        let dns_failed = DnsOutcome::Failed { reason: "SERVFAIL".into() };

        assert_eq!(classify(&resolved(), &unreachable), Classification::Active);
        assert_eq!(classify(&dns_failed, &responded), Classification::Active);
        assert_eq!(classify(&resolved(), &protocol), Classification::Active);
        assert_eq!(classify(&dns_failed, &protocol), Classification::Error);
        assert_eq!(classify(&dns_failed, &unreachable), Classification::Inactive);
        assert_eq!(
            classify(&DnsOutcome::NoSuchName, &HttpOutcome::Skipped),
            Classification::Inactive
        );
        // resolved with no addresses does not count
        assert_eq!(
            classify(&DnsOutcome::Resolved { addresses: vec![] }, &unreachable),
            Classification::Inactive
        );
    }

    #[test]
    fn test_outcomes_serialize_tagged() {
        let value = serde_json::to_value(&DnsOutcome::NoSuchName).unwrap();
        assert_eq!(value["status"], "no_such_name");
        let value = serde_json::to_value(Classification::Active).unwrap();
        assert_eq!(value, "active");
        let value = serde_json::to_value(&HttpOutcome::Skipped).unwrap();
        assert_eq!(value["status"], "skipped");
    }

    #[tokio::test]
    async fn test_nxdomain_skips_http() {
        let http = Arc::new(CountingHttp::default());
        let stats = Arc::new(ProbeStats::new());
        let prober = NetworkProber::new(
            Arc::new(StaticDns(HashMap::new())),
            http.clone(),
            stats.clone(),
        );

        let result = prober.probe("gone.example.com").await;

        assert_eq!(result.classification, Classification::Inactive);
        assert_eq!(result.http, HttpOutcome::Skipped);
        assert_eq!(http.calls.load(Ordering::SeqCst), 0);
        assert_eq!(stats.get(ProbeEvent::DnsNoSuchName), 1);
    }

    #[tokio::test]
    async fn test_dns_failure_still_checks_http() {
        let http = Arc::new(CountingHttp::default());
        let dns = StaticDns(HashMap::from([(
            "proxied.example.com",
            DnsOutcome::Failed { reason: "SERVFAIL".into() },
        )]));
        let prober = NetworkProber::new(Arc::new(dns), http.clone(), Arc::new(ProbeStats::new()));

        let result = prober.probe("proxied.example.com").await;

        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.classification, Classification::Active);
        assert_eq!(result.http.status_code(), Some(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dns_timeout_is_recorded() {
        let stats = Arc::new(ProbeStats::new());
        let prober = NetworkProber::new(
            Arc::new(HangingDns),
            Arc::new(CountingHttp::default()),
            stats.clone(),
        );

        let result = prober.probe("slow.example.com").await;

        assert!(matches!(&result.dns, DnsOutcome::Failed { reason } if reason.contains("timed out")));
        assert_eq!(stats.get(ProbeEvent::DnsTimeout), 1);
        // HTTP still answered
        assert_eq!(result.classification, Classification::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_bounds_hung_http() {
        let dns = StaticDns(HashMap::from([(
            "hung.example.com",
            DnsOutcome::Failed { reason: "SERVFAIL".into() },
        )]));
        let http = Arc::new(CountingHttp {
            hang: true,
            ..Default::default()
        });
        let stats = Arc::new(ProbeStats::new());
        let prober = NetworkProber::new(Arc::new(dns), http, stats.clone())
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(3));

        let started = Instant::now();
        let result = prober.probe("hung.example.com").await;

        assert!(started.elapsed() <= Duration::from_secs(4));
        assert_eq!(result.classification, Classification::Inactive);
        assert!(matches!(result.http, HttpOutcome::Unreachable { .. }));
        assert_eq!(stats.get(ProbeEvent::ProbeCeilingExceeded), 1);
    }
}
