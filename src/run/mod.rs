//! Run controller.
//!
//! Drives one reconnaissance run through its stages: discovery, validation,
//! reporting. A single global deadline, fixed when the run starts, covers
//! discovery and validation together. Only structural problems fail a run;
//! everything else ends up in the report's `errors`.

mod finalize;
mod resources;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::time::Instant;

use crate::config::{Config, RunConfig};
use crate::discovery::{discover, DiscoverySettings};
use crate::error_handling::RunError;
use crate::pool::validate;
use crate::probe::Prober;
use crate::report::{build, Report};

pub use resources::RunResources;
pub use state::RunState;
use state::RunTracker;

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every requested report file was written
    Completed,
    /// A structural error aborted the run
    Failed,
}

/// What a run hands back to its caller.
#[derive(Debug)]
pub struct RunOutcome {
    /// Terminal status
    pub status: RunStatus,
    /// The report, when one was built (also on write failures)
    pub report: Option<Report>,
    /// Description of the fatal error, if the run failed
    pub error: Option<String>,
    /// Report files written
    pub files: Vec<PathBuf>,
    /// Raw enumerator capture left in the output directory, if any
    pub raw_output: Option<PathBuf>,
}

impl RunOutcome {
    fn failed(error: &RunError, report: Option<Report>) -> Self {
        RunOutcome {
            status: RunStatus::Failed,
            report,
            error: Some(error.to_string()),
            files: Vec::new(),
            raw_output: None,
        }
    }

    /// True if the run completed.
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Runs reconnaissance for `config.domain` against the real network.
///
/// Never panics or returns early on network trouble: the returned outcome is
/// `Failed` only for an invalid configuration, an uncreatable output directory,
/// or a report that could not be rendered or written.
///
/// # Example
///
/// ```no_run
/// use subdomain_recon::{run_reconnaissance, Config};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = Config {
///     domain: "example.com".to_string(),
///     timeout_secs: 60,
///     workers: 10,
///     ..Default::default()
/// };
/// let outcome = run_reconnaissance(config).await;
/// if let Some(report) = &outcome.report {
///     println!("{} of {} active", report.active_subdomains(), report.total_subdomains());
/// }
/// # }
/// ```
pub async fn run_reconnaissance(config: Config) -> RunOutcome {
    run_with(config, RunResources::init).await
}

/// Like [`run_reconnaissance`], but probes candidates with `prober`.
pub async fn run_reconnaissance_with(config: Config, prober: Arc<dyn Prober>) -> RunOutcome {
    run_with(config, move |run_config| {
        RunResources::with_prober(run_config, prober)
    })
    .await
}

async fn run_with<F, E>(config: Config, make_resources: F) -> RunOutcome
where
    F: FnOnce(&RunConfig) -> Result<RunResources, E>,
    E: Into<RunError>,
{
    let mut tracker = RunTracker::new(&config.domain);

    let run_config = match config.validate() {
        Ok(run_config) => run_config,
        Err(e) => return fail(&mut tracker, e.into(), None),
    };

    if let Err(source) = std::fs::create_dir_all(&run_config.output_dir) {
        let e = RunError::OutputDirectory {
            path: run_config.output_dir.clone(),
            source,
        };
        return fail(&mut tracker, e, None);
    }

    let resources = match make_resources(&run_config) {
        Ok(resources) => resources,
        Err(e) => return fail(&mut tracker, e.into(), None),
    };

    execute(&mut tracker, run_config, resources).await
}

async fn execute(
    tracker: &mut RunTracker,
    config: RunConfig,
    resources: RunResources,
) -> RunOutcome {
    let start_time = chrono::Utc::now();
    let started = Instant::now();
    let deadline = started + config.timeout;
    info!(
        "Starting reconnaissance of {} (timeout {}s, {} workers)",
        config.domain,
        config.timeout.as_secs(),
        config.workers
    );

    tracker.advance(RunState::Discovering);
    let settings = DiscoverySettings {
        domain: config.domain.clone(),
        enumerators: config.enumerators.clone(),
        wordlist: config.wordlist.clone(),
        transparency: config.transparency.clone(),
        output_dir: config.output_dir.clone(),
    };
    let discovery = discover(&settings, Arc::clone(&resources.discovery_client), deadline).await;
    info!(
        "Discovered {} candidates for {}{}",
        discovery.candidates.len(),
        config.domain,
        if discovery.used_fallback {
            " (fallback)"
        } else {
            ""
        }
    );
    if let Some(path) = &discovery.raw_output {
        info!("Raw enumerator output kept at {}", path.display());
    }
    let raw_output = discovery.raw_output;
    let mut errors = discovery.errors;

    tracker.advance(RunState::Validating);
    let candidates: Arc<[_]> = discovery.candidates.into();
    let validation = validate(
        Arc::clone(&candidates),
        config.workers,
        deadline,
        Arc::clone(&resources.prober),
    )
    .await;
    if validation.timed_out {
        warn!(
            "Deadline reached with {} of {} candidates probed",
            validation.results.len(),
            candidates.len()
        );
    }
    errors.extend(validation.errors);

    tracker.advance(RunState::Reporting);
    let report = build(
        config.domain.clone(),
        candidates.to_vec(),
        validation.results,
        errors,
        start_time,
    );

    let elapsed_seconds = started.elapsed().as_secs_f64();
    finalize::print_probe_statistics(&resources.stats);
    finalize::print_summary(&report, elapsed_seconds, config.verbose);

    match finalize::write_reports(&config, &report) {
        Ok(files) => {
            tracker.advance(RunState::Completed);
            RunOutcome {
                status: RunStatus::Completed,
                report: Some(report),
                error: None,
                files,
                raw_output,
            }
        }
        Err(e) => {
            let mut outcome = fail(tracker, e, Some(report));
            outcome.raw_output = raw_output;
            outcome
        }
    }
}

fn fail(tracker: &mut RunTracker, e: RunError, report: Option<Report>) -> RunOutcome {
    error!("Reconnaissance failed while {:?}: {}", tracker.state(), e);
    tracker.advance(RunState::Failed);
    RunOutcome::failed(&e, report)
}
