//! Report building, rendering, and atomic file output.
//!
//! A [`Report`] is assembled once per run from the discovered candidates and
//! the completed probe results, then rendered to JSON and/or CSV. Counts and
//! the active-host list are derived from the stored results, so they always
//! agree with them.

mod csv;
mod json;
mod write;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::{CSV_REPORT_SUFFIX, JSON_REPORT_SUFFIX};
use crate::discovery::Candidate;
use crate::domain::Domain;
use crate::error_handling::RunError;
use crate::probe::{Classification, ProbeResult};

pub use write::write_atomic;

/// Output encodings of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `{domain}_reconnaissance_report.json`
    Json,
    /// `{domain}_subdomains.csv`
    Csv,
}

impl Format {
    /// Short lowercase name, used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }

    /// Fixed file name for `domain` in this format.
    pub fn file_name(&self, domain: &Domain) -> String {
        let suffix = match self {
            Format::Json => JSON_REPORT_SUFFIX,
            Format::Csv => CSV_REPORT_SUFFIX,
        };
        format!("{domain}{suffix}")
    }

    /// Full output path under `dir`.
    pub fn path_in(&self, dir: &Path, domain: &Domain) -> PathBuf {
        dir.join(self.file_name(domain))
    }
}

/// The aggregate result of one reconnaissance run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Target domain
    pub domain: Domain,
    /// When the run started
    pub timestamp: DateTime<Utc>,
    /// Every discovered candidate, in discovery order
    pub candidates: Vec<Candidate>,
    /// At most one result per candidate, in candidate order
    pub results: Vec<ProbeResult>,
    /// Non-fatal problems encountered during the run
    pub errors: Vec<String>,
}

impl Report {
    /// Number of discovered candidates, the apex included.
    pub fn total_subdomains(&self) -> usize {
        self.candidates.len()
    }

    /// Number of results classified active.
    pub fn active_subdomains(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.classification == Classification::Active)
            .count()
    }

    /// Active results in discovery order, borrowed from `results`.
    pub fn active_hosts(&self) -> Vec<&ProbeResult> {
        self.results
            .iter()
            .filter(|r| r.classification == Classification::Active)
            .collect()
    }

    /// Result for each candidate (`None` if it was never probed).
    pub fn rows(&self) -> impl Iterator<Item = (&Candidate, Option<&ProbeResult>)> {
        let by_name: HashMap<&str, &ProbeResult> = self
            .results
            .iter()
            .map(|r| (r.hostname.as_str(), r))
            .collect();
        self.candidates
            .iter()
            .map(move |c| (c, by_name.get(c.name.as_str()).copied()))
    }
}

/// Assembles a report.
///
/// `results` may arrive in any order; they are put in candidate order, and
/// results for hostnames that are not candidates (or repeats) are dropped.
pub fn build(
    domain: Domain,
    candidates: Vec<Candidate>,
    results: Vec<ProbeResult>,
    errors: Vec<String>,
    start_time: DateTime<Utc>,
) -> Report {
    let positions: HashMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();

    let mut slots: Vec<Option<ProbeResult>> = vec![None; candidates.len()];
    for result in results {
        match positions.get(result.hostname.as_str()) {
            Some(&i) if slots[i].is_none() => slots[i] = Some(result),
            Some(_) => log::debug!("Duplicate result for {} ignored", result.hostname),
            None => log::debug!("Result for unknown host {} ignored", result.hostname),
        }
    }
    let results = slots.into_iter().flatten().collect();

    Report {
        domain,
        timestamp: start_time,
        candidates,
        results,
        errors,
    }
}

/// Renders `report` in `format`.
///
/// # Errors
///
/// Returns `RunError::Render` if serialization fails.
pub fn render(report: &Report, format: Format) -> Result<Vec<u8>, RunError> {
    let rendered = match format {
        Format::Json => json::render_json(report).map_err(|e| e.to_string()),
        Format::Csv => csv::render_csv(report).map_err(|e| format!("{e:#}")),
    };
    rendered.map_err(|message| RunError::Render {
        format: format.as_str(),
        message,
    })
}
