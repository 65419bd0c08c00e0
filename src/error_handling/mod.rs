//! Error handling and probe statistics.
//!
//! This module provides:
//! - Fatal error types (initialization, configuration, run)
//! - HTTP failure categorization
//! - Probe event statistics
//!
//! Failures are split into two groups:
//! - **Fatal**: configuration or I/O problems that abort a run
//! - **Absorbed**: per-candidate and per-source problems, recorded as probe
//!   outcomes or as entries in the report's error list

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, HttpFailureKind};
pub use stats::ProbeStats;
pub use types::{ConfigError, InitializationError, ProbeEvent, RunError};
