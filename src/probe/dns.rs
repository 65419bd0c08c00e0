//! Address resolution through `hickory-resolver`.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;

use super::{DnsLookup, DnsOutcome};

/// [`DnsLookup`] backed by the shared async resolver.
pub struct HickoryLookup {
    resolver: Arc<TokioAsyncResolver>,
}

impl HickoryLookup {
    /// Wraps a shared resolver.
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(&self, hostname: &str) -> DnsOutcome {
        match self.resolver.lookup_ip(hostname).await {
            Ok(response) => {
                let mut addresses: Vec<IpAddr> = Vec::new();
                for ip in response.iter() {
                    if !addresses.contains(&ip) {
                        addresses.push(ip);
                    }
                }
                if addresses.is_empty() {
                    DnsOutcome::Failed {
                        reason: "no address records".to_string(),
                    }
                } else {
                    DnsOutcome::Resolved { addresses }
                }
            }
            Err(e) => outcome_from_error(&e),
        }
    }
}

/// Maps a resolver error to a DNS outcome. Only NXDOMAIN is "no such name";
/// an empty NOERROR answer is a plain failure.
fn outcome_from_error(error: &ResolveError) -> DnsOutcome {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            DnsOutcome::NoSuchName
        }
        ResolveErrorKind::NoRecordsFound { response_code, .. } => DnsOutcome::Failed {
            reason: format!("no address records ({response_code})"),
        },
        ResolveErrorKind::Timeout => DnsOutcome::Failed {
            reason: "DNS lookup timed out".to_string(),
        },
        _ => DnsOutcome::Failed {
            reason: error.to_string(),
        },
    }
}
