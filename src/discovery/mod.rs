//! Candidate discovery.
//!
//! This module gathers the set of hostnames to validate:
//! - The primary source runs an external enumeration tool as a subprocess
//! - The fallback source combines a wordlist with the domain and, optionally,
//!   queries certificate transparency logs
//!
//! The source is picked at runtime by an availability check on the configured
//! executables. Every failure is absorbed into the returned error list; discovery
//! itself never fails, and the apex domain is always a candidate.

mod enumerator;
mod parse;
mod transparency;
mod wordlist;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::RAW_ENUMERATION_SUFFIX;
use crate::domain::Domain;

pub use enumerator::{locate_executable, EnumerationOutcome};
pub use parse::parse_enumerator_output;

/// Which discovery method produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The target domain itself
    Apex,
    /// The external enumeration tool
    Enumerator,
    /// Built-in or user-supplied wordlist
    Wordlist,
    /// Certificate transparency search
    CertificateTransparency,
}

impl SourceKind {
    /// Name used in the CSV `source` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Apex => "apex",
            SourceKind::Enumerator => "enumerator",
            SourceKind::Wordlist => "wordlist",
            SourceKind::CertificateTransparency => "certificate_transparency",
        }
    }
}

/// A hostname believed to be a subdomain of the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Fully-qualified hostname, lowercase
    pub name: String,
    /// Discovery method that produced it first
    pub source: SourceKind,
}

/// Insertion-ordered, case-insensitively deduplicated candidates.
#[derive(Debug, Default)]
pub struct CandidateSet {
    ordered: Vec<Candidate>,
    seen: HashSet<String>,
}

impl CandidateSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hostname; returns false if it was already present.
    pub fn insert(&mut self, name: &str, source: SourceKind) -> bool {
        let key = name.to_ascii_lowercase();
        if !self.seen.insert(key.clone()) {
            return false;
        }
        self.ordered.push(Candidate { name: key, source });
        true
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True if nothing was inserted.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Number of candidates not produced by `source`.
    fn count_other_than(&self, source: SourceKind) -> usize {
        self.ordered.iter().filter(|c| c.source != source).count()
    }

    /// Candidates in insertion order.
    pub fn into_vec(self) -> Vec<Candidate> {
        self.ordered
    }
}

/// Everything discovery needs from the run.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Target domain
    pub domain: Domain,
    /// Enumeration tool executables, tried in order
    pub enumerators: Vec<String>,
    /// Wordlist fallback labels
    pub wordlist: Vec<String>,
    /// Certificate transparency base URL (fallback only)
    pub transparency: Option<String>,
    /// Directory for the raw enumerator capture
    pub output_dir: PathBuf,
}

impl DiscoverySettings {
    /// Path of the raw enumerator capture for this domain.
    pub fn raw_output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.domain, RAW_ENUMERATION_SUFFIX))
    }
}

/// Result of candidate discovery.
#[derive(Debug)]
pub struct Discovery {
    /// Candidates in discovery order
    pub candidates: Vec<Candidate>,
    /// Whether the fallback source was used
    pub used_fallback: bool,
    /// Non-fatal problems encountered
    pub errors: Vec<String>,
    /// Raw enumerator capture, if one was written
    pub raw_output: Option<PathBuf>,
}

/// The discovery strategy chosen by the availability check.
#[derive(Debug)]
enum DiscoverySource {
    /// Run the enumeration tool at this path
    Enumerator(PathBuf),
    /// No usable tool; generate candidates locally
    Fallback { reason: String },
}

impl DiscoverySource {
    fn select(enumerators: &[String]) -> Self {
        for name in enumerators {
            if let Some(path) = locate_executable(name) {
                return DiscoverySource::Enumerator(path);
            }
            debug!("Enumeration tool '{}' not found", name);
        }
        let reason = if enumerators.is_empty() {
            "no enumeration tool configured".to_string()
        } else {
            format!("{} not found", enumerators.join(", "))
        };
        DiscoverySource::Fallback { reason }
    }
}

/// Discovers candidate hostnames for the configured domain.
///
/// Bounded by `deadline`: the enumerator subprocess is killed and the
/// certificate transparency request abandoned when it passes.
pub async fn discover(
    settings: &DiscoverySettings,
    client: Arc<reqwest::Client>,
    deadline: Instant,
) -> Discovery {
    let domain = &settings.domain;
    let mut set = CandidateSet::new();
    let mut errors = Vec::new();
    let mut raw_output = None;

    set.insert(domain.as_str(), SourceKind::Apex);

    let fallback_reason = match DiscoverySource::select(&settings.enumerators) {
        DiscoverySource::Enumerator(exe) => {
            let raw_path = settings.raw_output_path();
            info!("Running {} for {}", exe.display(), domain);
            match enumerator::run_enumerator(&exe, domain, &raw_path, deadline).await {
                EnumerationOutcome::Finished { lines } => {
                    raw_output = existing(&raw_path);
                    let added = add_parsed(&mut set, domain, &lines);
                    info!("Enumerator found {} subdomains for {}", added, domain);
                    if set.count_other_than(SourceKind::Apex) == 0 {
                        errors.push(format!(
                            "No subdomains found for {} by {}",
                            domain,
                            exe.display()
                        ));
                    }
                    None
                }
                EnumerationOutcome::Unavailable { reason } => Some(reason),
                EnumerationOutcome::Failed { reason, lines } => {
                    raw_output = existing(&raw_path);
                    warn!("Enumerator failed for {}: {}", domain, reason);
                    errors.push(format!("Enumerator failed: {reason}"));
                    add_parsed(&mut set, domain, &lines);
                    if set.count_other_than(SourceKind::Apex) == 0 {
                        Some("enumerator produced no candidates".to_string())
                    } else {
                        None
                    }
                }
            }
        }
        DiscoverySource::Fallback { reason } => Some(reason),
    };

    let used_fallback = fallback_reason.is_some();
    if let Some(reason) = fallback_reason {
        warn!("{}; using fallback subdomain enumeration", reason);
        errors.push(format!("Fallback enumeration triggered: {reason}"));
        run_fallback(settings, client, deadline, &mut set, &mut errors).await;
    }

    if set.count_other_than(SourceKind::Apex) == 0 {
        debug!("Only the apex domain is a candidate for {}", domain);
    }

    Discovery {
        candidates: set.into_vec(),
        used_fallback,
        errors,
        raw_output,
    }
}

async fn run_fallback(
    settings: &DiscoverySettings,
    client: Arc<reqwest::Client>,
    deadline: Instant,
    set: &mut CandidateSet,
    errors: &mut Vec<String>,
) {
    let domain = &settings.domain;

    let (hosts, label_errors) = wordlist::wordlist_candidates(domain, &settings.wordlist);
    errors.extend(label_errors);
    for host in &hosts {
        set.insert(host, SourceKind::Wordlist);
    }
    debug!("Wordlist produced {} candidates", hosts.len());

    if let Some(base_url) = &settings.transparency {
        match transparency::lookup(&client, base_url, domain, deadline).await {
            Ok(hosts) => {
                let mut added = 0;
                for host in &hosts {
                    if set.insert(host, SourceKind::CertificateTransparency) {
                        added += 1;
                    }
                }
                info!(
                    "Certificate transparency returned {} names ({} new)",
                    hosts.len(),
                    added
                );
            }
            Err(e) => {
                warn!("Certificate transparency lookup failed: {e:#}");
                errors.push(format!("Certificate transparency lookup failed: {e:#}"));
            }
        }
    }
}

fn add_parsed(set: &mut CandidateSet, domain: &Domain, lines: &str) -> usize {
    let (hosts, rejected) = parse_enumerator_output(lines, domain);
    if rejected > 0 {
        debug!("Discarded {} enumerator lines outside {}", rejected, domain);
    }
    hosts
        .iter()
        .filter(|h| set.insert(h, SourceKind::Enumerator))
        .count()
}

fn existing(path: &Path) -> Option<PathBuf> {
    path.is_file().then(|| path.to_path_buf())
}
