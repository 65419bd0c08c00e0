//! subdomain_recon library: passive subdomain discovery and liveness validation
//!
//! Given a registrable domain, a run discovers candidate subdomains (through an
//! external enumeration tool, or a wordlist and certificate transparency
//! fallback), probes each candidate over DNS and HTTP(S) with a bounded pool of
//! workers under one global deadline, and writes a JSON and a CSV report.
//!
//! # Example
//!
//! ```no_run
//! use subdomain_recon::{run_reconnaissance, Config, RunStatus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     domain: "example.com".to_string(),
//!     timeout_secs: 120,
//!     workers: 20,
//!     ..Default::default()
//! };
//!
//! let outcome = run_reconnaissance(config).await;
//! match (outcome.status, &outcome.report) {
//!     (RunStatus::Completed, Some(report)) => println!(
//!         "{} candidates, {} active",
//!         report.total_subdomains(),
//!         report.active_subdomains()
//!     ),
//!     _ => eprintln!("run failed: {:?}", outcome.error),
//! }
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
pub mod discovery;
mod domain;
mod error_handling;
pub mod initialization;
mod pool;
pub mod probe;
pub mod report;
mod run;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt, RunConfig};
pub use discovery::{Candidate, Discovery, SourceKind};
pub use domain::Domain;
pub use error_handling::{ConfigError, InitializationError, ProbeEvent, ProbeStats, RunError};
pub use pool::{validate, ValidationOutcome};
pub use probe::{
    classify, Classification, DnsLookup, DnsOutcome, HttpCheck, HttpOutcome, NetworkProber,
    ProbeResult, Prober, Scheme,
};
pub use report::{build, render, Format, Report};
pub use run::{
    run_reconnaissance, run_reconnaissance_with, RunOutcome, RunResources, RunState, RunStatus,
};
