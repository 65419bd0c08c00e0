//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including run budgets, per-probe timeouts, and discovery defaults.

use std::time::Duration;

// Run budgets (inclusive bounds enforced by `Config::validate`)
/// Smallest accepted global timeout in seconds
pub const MIN_TIMEOUT_SECS: u64 = 30;
/// Largest accepted global timeout in seconds
pub const MAX_TIMEOUT_SECS: u64 = 300;
/// Global timeout used when none is given
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Smallest accepted worker count
pub const MIN_WORKERS: usize = 1;
/// Largest accepted worker count
pub const MAX_WORKERS: usize = 30;
/// Worker count used when none is given
pub const DEFAULT_WORKERS: usize = 20;

// Network operation timeouts
/// DNS lookup timeout in seconds (per candidate)
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// HTTP request timeout in seconds (per scheme attempt)
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Ceiling for one whole probe: DNS + HTTPS + HTTP plus a little slack.
/// A hung candidate can hold a worker slot for at most this long.
pub const PROBE_CEILING: Duration =
    Duration::from_secs(DNS_TIMEOUT_SECS + 2 * HTTP_TIMEOUT_SECS + 2);
/// DNS attempts per query before giving up
pub const DNS_ATTEMPTS: usize = 2;

// Redirect handling
/// Maximum number of redirect hops to follow during the HTTP check
pub const MAX_REDIRECT_HOPS: usize = 5;

/// Progress logging interval in seconds while validation runs
pub const LOGGING_INTERVAL: u64 = 5;

/// Default output directory for report files
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default User-Agent string for HTTP requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Discovery
/// Executables tried, in order, for the primary enumeration tool
pub const DEFAULT_ENUMERATORS: &[&str] = &["amass"];

/// Labels combined with the target domain by the wordlist fallback
pub const COMMON_SUBDOMAINS: &[&str] = &[
    "www", "mail", "ftp", "admin", "api", "app", "dev", "test", "staging", "blog", "shop",
    "store", "forum", "support", "help", "docs", "cdn", "static", "assets", "images", "media",
    "files", "download", "uploads",
];

/// Base URL of the certificate transparency search used by the fallback
pub const DEFAULT_CRTSH_URL: &str = "https://crt.sh";

/// Shell exit code for "command not found"
pub const EXIT_CODE_NOT_FOUND: i32 = 127;
/// Shell exit code for "found but not executable"
pub const EXIT_CODE_NOT_EXECUTABLE: i32 = 126;

// Output artifacts (prefixed with the domain)
/// JSON report file suffix
pub const JSON_REPORT_SUFFIX: &str = "_reconnaissance_report.json";
/// CSV report file suffix
pub const CSV_REPORT_SUFFIX: &str = "_subdomains.csv";
/// Raw enumerator capture file suffix
pub const RAW_ENUMERATION_SUFFIX: &str = "_amass_results.text";
