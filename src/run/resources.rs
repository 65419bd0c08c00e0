//! Per-run network resources.

use std::sync::Arc;

use crate::config::RunConfig;
use crate::error_handling::{InitializationError, ProbeStats};
use crate::initialization::{init_discovery_client, init_probe_client, init_resolver};
use crate::probe::{HickoryLookup, NetworkProber, Prober, ReqwestCheck};

/// Everything a run needs besides its configuration.
///
/// Nothing here is shared between runs, so concurrent runs for different
/// domains do not interfere.
pub struct RunResources {
    /// Probes one candidate
    pub prober: Arc<dyn Prober>,
    /// Client for passive lookups during discovery
    pub discovery_client: Arc<reqwest::Client>,
    /// Probe event counters (empty when an external prober is supplied)
    pub stats: Arc<ProbeStats>,
}

impl RunResources {
    /// Builds the resolver, HTTP clients and the network prober.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if a client cannot be built.
    pub fn init(config: &RunConfig) -> Result<Self, InitializationError> {
        let stats = Arc::new(ProbeStats::new());
        let probe_client = init_probe_client(config)?;
        let dns = Arc::new(HickoryLookup::new(init_resolver()));
        let http = Arc::new(ReqwestCheck::new(probe_client, Arc::clone(&stats)));
        let prober = Arc::new(NetworkProber::new(dns, http, Arc::clone(&stats)));

        Ok(Self {
            prober,
            discovery_client: init_discovery_client(config)?,
            stats,
        })
    }

    /// Uses `prober` instead of the network prober.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the discovery client
    /// cannot be built.
    pub fn with_prober(
        config: &RunConfig,
        prober: Arc<dyn Prober>,
    ) -> Result<Self, InitializationError> {
        Ok(Self {
            prober,
            discovery_client: init_discovery_client(config)?,
            stats: Arc::new(ProbeStats::new()),
        })
    }
}
