//! Error type definitions.
//!
//! This module defines the fatal error types and the probe event taxonomy used
//! throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// A caller-supplied configuration that cannot be run.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The domain is not a hostname under a known public suffix.
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain {
        /// Domain as given by the caller
        domain: String,
        /// Why it was rejected
        reason: String,
    },

    /// Global timeout outside the accepted range.
    #[error("Timeout {value}s is outside the accepted range {min}..={max}")]
    TimeoutOutOfRange {
        /// Requested value
        value: u64,
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },

    /// Worker count outside the accepted range.
    #[error("Worker count {value} is outside the accepted range {min}..={max}")]
    WorkersOutOfRange {
        /// Requested value
        value: usize,
        /// Lower bound
        min: usize,
        /// Upper bound
        max: usize,
    },

    /// `json_only` and `csv_only` were both set.
    #[error("json_only and csv_only cannot both be set")]
    ConflictingFormats,
}

/// Structural failures that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The run configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shared network resources could not be created.
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A report could not be rendered.
    #[error("Failed to render {format} report: {message}")]
    Render {
        /// Encoding being rendered
        format: &'static str,
        /// Renderer error message
        message: String,
    },

    /// A report file could not be written.
    #[error("Failed to write report {}: {source}", path.display())]
    WriteReport {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Notable events recorded while probing candidates.
///
/// Every probe records one DNS event and one event per HTTP request made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ProbeEvent {
    // DNS
    DnsResolved,
    DnsNoSuchName,
    DnsTimeout,
    DnsFailure,
    // HTTP
    HttpsResponded,
    HttpResponded,
    HttpConnectFailure,
    HttpTlsFailure,
    HttpTimeout,
    HttpProtocolError,
    // Whole probe
    ProbeCeilingExceeded,
}

impl std::fmt::Display for ProbeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProbeEvent {
    /// Label used in the statistics summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeEvent::DnsResolved => "DNS resolved",
            ProbeEvent::DnsNoSuchName => "DNS no such name",
            ProbeEvent::DnsTimeout => "DNS timeout",
            ProbeEvent::DnsFailure => "DNS failure",
            ProbeEvent::HttpsResponded => "HTTPS responded",
            ProbeEvent::HttpResponded => "HTTP responded",
            ProbeEvent::HttpConnectFailure => "HTTP connect failure",
            ProbeEvent::HttpTlsFailure => "TLS failure",
            ProbeEvent::HttpTimeout => "HTTP timeout",
            ProbeEvent::HttpProtocolError => "HTTP protocol error",
            ProbeEvent::ProbeCeilingExceeded => "Probe ceiling exceeded",
        }
    }

    /// Whether this event is a failure worth surfacing in the summary.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            ProbeEvent::DnsResolved | ProbeEvent::HttpsResponded | ProbeEvent::HttpResponded
        )
    }
}
