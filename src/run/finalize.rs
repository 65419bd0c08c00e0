//! Report output and end-of-run summary.

use std::path::PathBuf;

use log::info;

use crate::config::{OutputFormats, RunConfig};
use crate::error_handling::{ProbeStats, RunError};
use crate::report::{render, write_atomic, Format, Report};

/// Renders and writes every requested encoding, returning the written paths.
///
/// Stops at the first failure; files already written stay complete.
pub(crate) fn write_reports(config: &RunConfig, report: &Report) -> Result<Vec<PathBuf>, RunError> {
    let mut written = Vec::new();
    for format in requested(config.formats) {
        let path = format.path_in(&config.output_dir, &config.domain);
        let bytes = render(report, format)?;
        write_atomic(&path, &bytes)?;
        info!("Wrote {} report to {}", format.as_str(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn requested(formats: OutputFormats) -> Vec<Format> {
    let mut list = Vec::with_capacity(2);
    if formats.json {
        list.push(Format::Json);
    }
    if formats.csv {
        list.push(Format::Csv);
    }
    list
}

/// Logs the probe event counters that are non-zero.
pub(crate) fn print_probe_statistics(stats: &ProbeStats) {
    let counts = stats.non_zero();
    if counts.is_empty() {
        return;
    }
    info!(
        "Probe events ({} failures):",
        stats.total_failures()
    );
    for (event, count) in counts {
        info!("   {}: {}", event.as_str(), count);
    }
}

/// Logs a one-line summary of the run, plus each active host when verbose.
pub(crate) fn print_summary(report: &Report, elapsed_seconds: f64, verbose: bool) {
    let total = report.total_subdomains();
    info!(
        "Reconnaissance of {} finished: {} candidate{}, {} active, {} error{} in {:.1}s",
        report.domain,
        total,
        if total == 1 { "" } else { "s" },
        report.active_subdomains(),
        report.errors.len(),
        if report.errors.len() == 1 { "" } else { "s" },
        elapsed_seconds
    );
    if verbose {
        for host in report.active_hosts() {
            info!(
                "   {} ({})",
                host.hostname,
                host.http
                    .status_code()
                    .map(|code| format!("HTTP {code}"))
                    .unwrap_or_else(|| "DNS only".to_string())
            );
        }
    }
}
