//! Configuration types.
//!
//! This module defines the library configuration (`Config`), the validated
//! per-run configuration (`RunConfig`) and the logging enums shared with the CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    COMMON_SUBDOMAINS, DEFAULT_CRTSH_URL, DEFAULT_ENUMERATORS, DEFAULT_OUTPUT_DIR,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_WORKERS, MAX_TIMEOUT_SECS, MAX_WORKERS,
    MIN_TIMEOUT_SECS, MIN_WORKERS,
};
use crate::domain::Domain;
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// This is what a caller hands to [`crate::run_reconnaissance`]. Nothing here is
/// trusted until [`Config::validate`] turns it into a [`RunConfig`].
///
/// # Examples
///
/// ```no_run
/// use subdomain_recon::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     domain: "example.com".to_string(),
///     output_dir: PathBuf::from("output"),
///     workers: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Target domain
    pub domain: String,

    /// Directory the report files are written to
    pub output_dir: PathBuf,

    /// Global wall-clock budget in seconds, covering discovery and validation
    pub timeout_secs: u64,

    /// Number of concurrent probe workers
    pub workers: usize,

    /// Verbose logging (debug level)
    pub verbose: bool,

    /// Only write the JSON report
    pub json_only: bool,

    /// Only write the CSV report
    pub csv_only: bool,

    /// Enumeration tool executables, tried in order
    pub enumerators: Vec<String>,

    /// Labels used by the wordlist fallback (`None` uses the built-in list)
    pub wordlist: Option<Vec<String>>,

    /// Certificate transparency base URL for the fallback (`None` disables it)
    pub transparency: Option<String>,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            verbose: false,
            json_only: false,
            csv_only: false,
            enumerators: DEFAULT_ENUMERATORS.iter().map(|s| s.to_string()).collect(),
            wordlist: None,
            transparency: Some(DEFAULT_CRTSH_URL.to_string()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Checks bounds and parses the domain, producing an immutable [`RunConfig`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the domain is not a valid hostname under a
    /// known public suffix, the timeout or worker count is out of range, or both
    /// output restrictions are requested at once.
    pub fn validate(&self) -> Result<RunConfig, ConfigError> {
        let domain = Domain::parse(&self.domain)?;

        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::TimeoutOutOfRange {
                value: self.timeout_secs,
                min: MIN_TIMEOUT_SECS,
                max: MAX_TIMEOUT_SECS,
            });
        }
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::WorkersOutOfRange {
                value: self.workers,
                min: MIN_WORKERS,
                max: MAX_WORKERS,
            });
        }
        if self.json_only && self.csv_only {
            return Err(ConfigError::ConflictingFormats);
        }

        let wordlist = match &self.wordlist {
            Some(labels) => labels
                .iter()
                .map(|l| l.trim().trim_matches('.').to_ascii_lowercase())
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .collect(),
            None => COMMON_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(RunConfig {
            domain,
            output_dir: self.output_dir.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            workers: self.workers,
            verbose: self.verbose,
            formats: OutputFormats {
                json: !self.csv_only,
                csv: !self.json_only,
            },
            enumerators: self.enumerators.clone(),
            wordlist,
            transparency: self.transparency.clone(),
            user_agent: self.user_agent.clone(),
        })
    }
}

/// Which report encodings a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormats {
    /// Write `{domain}_reconnaissance_report.json`
    pub json: bool,
    /// Write `{domain}_subdomains.csv`
    pub csv: bool,
}

/// Validated, immutable configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target domain
    pub domain: Domain,
    /// Directory the report files are written to
    pub output_dir: PathBuf,
    /// Global deadline budget
    pub timeout: Duration,
    /// Concurrent probe workers
    pub workers: usize,
    /// Verbose logging requested
    pub verbose: bool,
    /// Report encodings to write
    pub formats: OutputFormats,
    /// Enumeration tool executables, tried in order
    pub enumerators: Vec<String>,
    /// Wordlist fallback labels
    pub wordlist: Vec<String>,
    /// Certificate transparency base URL
    pub transparency: Option<String>,
    /// HTTP User-Agent header value
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(domain: &str) -> Config {
        Config {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.workers, 20);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.enumerators, vec!["amass".to_string()]);
        assert!(config.wordlist.is_none());
        assert!(!config.json_only);
        assert!(!config.csv_only);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let run = config("Example.COM").validate().expect("valid config");
        assert_eq!(run.domain.as_str(), "example.com");
        assert_eq!(run.timeout, Duration::from_secs(300));
        assert_eq!(run.workers, 20);
        assert_eq!(
            run.formats,
            OutputFormats {
                json: true,
                csv: true
            }
        );
        assert_eq!(run.wordlist.len(), COMMON_SUBDOMAINS.len());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let mut c = config("example.com");
        c.timeout_secs = 29;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::TimeoutOutOfRange { value: 29, .. })
        ));
        c.timeout_secs = 301;
        assert!(c.validate().is_err());
        c.timeout_secs = 30;
        assert!(c.validate().is_ok());
        c.timeout_secs = 300;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_worker_bounds() {
        let mut c = config("example.com");
        c.workers = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::WorkersOutOfRange { value: 0, .. })
        ));
        c.workers = 31;
        assert!(c.validate().is_err());
        c.workers = 1;
        assert!(c.validate().is_ok());
        c.workers = 30;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_conflicting_formats() {
        let mut c = config("example.com");
        c.json_only = true;
        c.csv_only = true;
        assert!(matches!(c.validate(), Err(ConfigError::ConflictingFormats)));

        c.csv_only = false;
        let run = c.validate().unwrap();
        assert!(run.formats.json);
        assert!(!run.formats.csv);
    }

    #[test]
    fn test_validate_custom_wordlist_is_cleaned() {
        let mut c = config("example.com");
        c.wordlist = Some(vec![
            " WWW ".to_string(),
            "".to_string(),
            "# comment".to_string(),
            "api.".to_string(),
        ]);
        let run = c.validate().unwrap();
        assert_eq!(run.wordlist, vec!["www".to_string(), "api".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_domain() {
        assert!(matches!(
            config("not a domain").validate(),
            Err(ConfigError::InvalidDomain { .. })
        ));
    }
}
