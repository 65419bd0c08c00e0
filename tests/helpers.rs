// Shared test helpers: an in-memory network and run configurations.
//
// Hostnames not listed in a `MockNetwork` get NXDOMAIN and no HTTP answer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subdomain_recon::{
    Config, DnsLookup, DnsOutcome, HttpCheck, HttpOutcome, NetworkProber, ProbeStats, Prober,
    Scheme,
};

/// Deterministic DNS and HTTP answers keyed by hostname.
#[derive(Default)]
pub struct MockNetwork {
    dns: HashMap<String, DnsOutcome>,
    http: HashMap<String, HttpOutcome>,
    delay: Duration,
    pub http_calls: AtomicUsize,
}

#[allow(dead_code)] // Not every test file uses every helper
impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup and check sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn resolves(mut self, host: &str, ip: &str) -> Self {
        self.dns.insert(
            host.to_string(),
            DnsOutcome::Resolved {
                addresses: vec![ip.parse().expect("valid test address")],
            },
        );
        self
    }

    pub fn dns_fails(mut self, host: &str, reason: &str) -> Self {
        self.dns.insert(
            host.to_string(),
            DnsOutcome::Failed {
                reason: reason.to_string(),
            },
        );
        self
    }

    pub fn serves(mut self, host: &str, status_code: u16) -> Self {
        let url = format!("https://{host}/");
        self.http.insert(
            host.to_string(),
            HttpOutcome::Responded {
                scheme: Scheme::Https,
                status_code,
                final_url: url.clone(),
                redirect_chain: vec![url],
                server: Some("mock".to_string()),
            },
        );
        self
    }

    pub fn breaks_protocol(mut self, host: &str) -> Self {
        self.http.insert(
            host.to_string(),
            HttpOutcome::ProtocolError {
                scheme: Scheme::Https,
                reason: "invalid HTTP version".to_string(),
            },
        );
        self
    }

    /// A prober running the real classification over this network.
    pub fn into_prober(self) -> Arc<dyn Prober> {
        let network = Arc::new(self);
        Arc::new(NetworkProber::new(
            network.clone(),
            network,
            Arc::new(ProbeStats::new()),
        ))
    }
}

#[async_trait]
impl DnsLookup for MockNetwork {
    async fn lookup(&self, hostname: &str) -> DnsOutcome {
        tokio::time::sleep(self.delay).await;
        self.dns
            .get(hostname)
            .cloned()
            .unwrap_or(DnsOutcome::NoSuchName)
    }
}

#[async_trait]
impl HttpCheck for MockNetwork {
    async fn check(&self, hostname: &str) -> HttpOutcome {
        self.http_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.http
            .get(hostname)
            .cloned()
            .unwrap_or_else(|| HttpOutcome::Unreachable {
                reason: "connection refused".to_string(),
            })
    }
}

/// A config with the enumeration tool absent, no certificate transparency,
/// and the given wordlist.
#[allow(dead_code)]
pub fn fallback_config(output_dir: &Path, domain: &str, wordlist: &[&str]) -> Config {
    Config {
        domain: domain.to_string(),
        output_dir: output_dir.to_path_buf(),
        timeout_secs: 60,
        workers: 5,
        enumerators: vec!["/nonexistent/bin/amass".to_string()],
        wordlist: Some(wordlist.iter().map(|s| s.to_string()).collect()),
        transparency: None,
        ..Default::default()
    }
}

/// Reads a JSON report written by a run.
#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("JSON report readable");
    serde_json::from_str(&text).expect("JSON report parses")
}

/// Reads the hostname column of a CSV report.
#[allow(dead_code)]
pub fn read_csv_hosts(path: &Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).expect("CSV report readable");
    let headers = reader.headers().expect("CSV header").clone();
    assert_eq!(&headers[0], "hostname");
    reader
        .records()
        .map(|r| r.expect("CSV row")[0].to_string())
        .collect()
}
