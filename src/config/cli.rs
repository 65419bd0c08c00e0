//! Command-line options.
//!
//! `Opt` is generated by `clap` and converted into the library [`Config`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::constants::{
    DEFAULT_CRTSH_URL, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_WORKERS, MAX_TIMEOUT_SECS, MAX_WORKERS, MIN_TIMEOUT_SECS, MIN_WORKERS,
};
use crate::config::types::{Config, LogFormat, LogLevel};

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Basic usage
/// subdomain_recon example.com
///
/// # Fewer workers, shorter budget, JSON only
/// subdomain_recon example.com --workers 5 --timeout 60 --json-only
///
/// # Custom wordlist for the fallback and a log file
/// subdomain_recon example.com --wordlist labels.txt --log-file reconnaissance.log
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "subdomain_recon",
    version,
    about = "Discovers subdomains of a domain and checks which of them are live."
)]
pub struct Opt {
    /// Target domain for reconnaissance
    #[arg(value_parser)]
    pub domain: String,

    /// Output directory for results
    #[arg(short, long, value_parser, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Output only JSON format
    #[arg(long, conflicts_with = "csv_only")]
    pub json_only: bool,

    /// Output only CSV format
    #[arg(long)]
    pub csv_only: bool,

    /// Global timeout in seconds (discovery + validation)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS)
    )]
    pub timeout: u64,

    /// Number of validation workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    pub workers: usize,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Write log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enumeration tool executable (repeatable, tried in order)
    #[arg(long = "enumerator", default_values_t = vec!["amass".to_string()])]
    pub enumerators: Vec<String>,

    /// File with one subdomain label per line for the fallback source
    #[arg(long)]
    pub wordlist: Option<PathBuf>,

    /// Certificate transparency base URL used by the fallback source
    #[arg(long, default_value = DEFAULT_CRTSH_URL)]
    pub crtsh_url: String,

    /// Skip the certificate transparency lookup in the fallback source
    #[arg(long)]
    pub no_crtsh: bool,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

fn parse_workers(s: &str) -> Result<usize, String> {
    let workers: usize = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
        Ok(workers)
    } else {
        Err(format!(
            "workers must be between {MIN_WORKERS} and {MAX_WORKERS}"
        ))
    }
}

impl Opt {
    /// Log level after applying `--verbose`.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            match self.log_level {
                LogLevel::Trace => LogLevel::Trace,
                _ => LogLevel::Debug,
            }
        } else {
            self.log_level.clone()
        }
    }

    /// Converts the parsed options into a library [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the `--wordlist` file cannot be read.
    pub fn into_config(self) -> Result<Config> {
        let wordlist = match &self.wordlist {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read wordlist {}", path.display()))?;
                Some(contents.lines().map(str::to_string).collect())
            }
            None => None,
        };
        let log_level = self.effective_log_level();

        Ok(Config {
            domain: self.domain,
            output_dir: self.output_dir,
            timeout_secs: self.timeout,
            workers: self.workers,
            verbose: self.verbose,
            json_only: self.json_only,
            csv_only: self.csv_only,
            enumerators: self.enumerators,
            wordlist,
            transparency: if self.no_crtsh {
                None
            } else {
                Some(self.crtsh_url)
            },
            user_agent: self.user_agent,
            log_level,
            log_format: self.log_format,
        })
    }
}
