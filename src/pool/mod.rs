//! Bounded-concurrency validation of candidates.
//!
//! A fixed number of workers claim candidates from a shared, read-only queue
//! (an index cursor over the discovery-ordered slice) and probe each one. The
//! run's global deadline bounds everything: no probe starts after it, probes
//! still in flight when it passes are dropped, and the pool returns whatever
//! completed.

mod progress;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::discovery::Candidate;
use crate::probe::{Classification, ProbeResult, Prober};

/// Results of a validation pass.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Completed results, in candidate (discovery) order
    pub results: Vec<ProbeResult>,
    /// Non-fatal problems (deadline reached, probe task failures)
    pub errors: Vec<String>,
    /// Whether the deadline cut validation short
    pub timed_out: bool,
}

/// State shared by all workers of one pass.
struct Shared {
    candidates: Arc<[Candidate]>,
    cursor: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    active: AtomicUsize,
    results: Mutex<Vec<(usize, ProbeResult)>>,
    errors: Mutex<Vec<String>>,
    deadline: Instant,
}

/// Probes every candidate with at most `workers` probes in flight.
///
/// Each candidate is probed at most once. Candidates not reached before
/// `deadline` get no result and the shortfall is recorded in `errors`.
pub async fn validate(
    candidates: Arc<[Candidate]>,
    workers: usize,
    deadline: Instant,
    prober: Arc<dyn Prober>,
) -> ValidationOutcome {
    let total = candidates.len();
    if total == 0 {
        return ValidationOutcome::default();
    }

    let started = Instant::now();
    let worker_count = workers.clamp(1, total);
    info!(
        "Validating {} candidates with {} workers",
        total, worker_count
    );

    let shared = Arc::new(Shared {
        candidates,
        cursor: AtomicUsize::new(0),
        completed: AtomicUsize::new(0),
        failed: AtomicUsize::new(0),
        active: AtomicUsize::new(0),
        results: Mutex::new(Vec::with_capacity(total)),
        errors: Mutex::new(Vec::new()),
        deadline,
    });

    let cancel = CancellationToken::new();
    let logging_task = progress::spawn_progress_logger(
        started,
        Arc::clone(&shared),
        cancel.child_token(),
    );

    let mut tasks = FuturesUnordered::new();
    for worker_id in 0..worker_count {
        let shared = Arc::clone(&shared);
        let prober = Arc::clone(&prober);
        tasks.push(tokio::spawn(run_worker(worker_id, shared, prober)));
    }

    while let Some(task_result) = tasks.next().await {
        if let Err(join_error) = task_result {
            warn!("Validation worker failed: {:?}", join_error);
            shared
                .errors
                .lock()
                .await
                .push(format!("Validation worker failed: {join_error}"));
        }
    }

    cancel.cancel();
    let _ = logging_task.await;
    progress::log_progress(started, &shared);

    let mut indexed = std::mem::take(&mut *shared.results.lock().await);
    indexed.sort_by_key(|(index, _)| *index);
    let results: Vec<ProbeResult> = indexed.into_iter().map(|(_, result)| result).collect();
    let mut errors = std::mem::take(&mut *shared.errors.lock().await);

    let finished = shared.completed.load(Ordering::SeqCst) + shared.failed.load(Ordering::SeqCst);
    let timed_out = finished < total;
    if timed_out {
        let message = format!(
            "Validation deadline reached: {} of {} candidates probed",
            results.len(),
            total
        );
        warn!("{}", message);
        errors.push(message);
    }

    ValidationOutcome {
        results,
        errors,
        timed_out,
    }
}

async fn run_worker(worker_id: usize, shared: Arc<Shared>, prober: Arc<dyn Prober>) {
    loop {
        if Instant::now() >= shared.deadline {
            debug!("Worker {} stopping at deadline", worker_id);
            break;
        }
        let index = shared.cursor.fetch_add(1, Ordering::SeqCst);
        let Some(candidate) = shared.candidates.get(index) else {
            break;
        };

        let name = candidate.name.clone();
        let task_prober = Arc::clone(&prober);
        let mut handle = tokio::spawn(async move { task_prober.probe(&name).await });

        match timeout_at(shared.deadline, &mut handle).await {
            Ok(Ok(result)) => {
                if result.classification == Classification::Active {
                    shared.active.fetch_add(1, Ordering::SeqCst);
                }
                shared.results.lock().await.push((index, result));
                shared.completed.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Err(join_error)) => {
                shared.failed.fetch_add(1, Ordering::SeqCst);
                warn!("Probe of {} failed: {}", candidate.name, join_error);
                shared
                    .errors
                    .lock()
                    .await
                    .push(format!("Probe of {} failed: {join_error}", candidate.name));
            }
            Err(_) => {
                handle.abort();
                debug!("Dropped in-flight probe of {} at deadline", candidate.name);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SourceKind;
    use crate::probe::{DnsOutcome, HttpOutcome};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Hosts starting with "up" are active, "panic" panics, "hang" never
    /// finishes; each probe takes `delay`.
    struct ScriptedProber {
        delay: Duration,
        probes: AtomicUsize,
    }

    impl ScriptedProber {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                probes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, hostname: &str) -> ProbeResult {
            self.probes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if hostname.starts_with("hang") {
                std::future::pending::<()>().await;
            }
            if hostname.starts_with("panic") {
                panic!("probe blew up");
            }
            let up = hostname.starts_with("up");
            ProbeResult {
                hostname: hostname.to_string(),
                classification: if up {
                    Classification::Active
                } else {
                    Classification::Inactive
                },
                dns: if up {
                    DnsOutcome::Resolved {
                        addresses: vec!["192.0.2.10".parse().unwrap()],
                    }
                } else {
                    DnsOutcome::NoSuchName
                },
                http: HttpOutcome::Skipped,
                elapsed_ms: self.delay.as_millis() as u64,
            }
        }
    }

    fn candidates(names: &[String]) -> Arc<[Candidate]> {
        names
            .iter()
            .map(|name| Candidate {
                name: name.clone(),
                source: SourceKind::Wordlist,
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}{i}.example.com")).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_candidates_probed_in_discovery_order() {
        let mut list = names("up", 5);
        list.extend(names("down", 5));
        let prober = ScriptedProber::new(Duration::from_millis(100));

        let outcome = validate(
            candidates(&list),
            3,
            Instant::now() + Duration::from_secs(60),
            prober.clone(),
        )
        .await;

        assert!(!outcome.timed_out);
        assert!(outcome.errors.is_empty());
        let hosts: Vec<_> = outcome.results.iter().map(|r| r.hostname.clone()).collect();
        assert_eq!(hosts, list);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_with_thirty_workers_and_hung_half() {
        // 50 answer quickly, 50 never finish
        let mut list = names("up", 50);
        list.extend(names("hang", 50));
        let prober = ScriptedProber::new(Duration::from_millis(10));

        let outcome = validate(
            candidates(&list),
            30,
            Instant::now() + Duration::from_secs(30),
            prober,
        )
        .await;

        assert!(outcome.timed_out);
        assert!(outcome.results.len() <= 50);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.hostname.starts_with("up")));
        assert!(outcome
            .errors
            .iter()
            .any(|e| e.contains("deadline reached") && e.contains("of 100")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_worker_stops_at_deadline() {
        let list = names("up", 10);
        let prober = ScriptedProber::new(Duration::from_secs(1));

        let outcome = validate(
            candidates(&list),
            1,
            Instant::now() + Duration::from_millis(3500),
            prober.clone(),
        )
        .await;

        assert!(outcome.timed_out);
        let hosts: Vec<_> = outcome.results.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(
            hosts,
            vec!["up0.example.com", "up1.example.com", "up2.example.com"]
        );
        // the fourth probe started and was dropped; none after it
        assert_eq!(prober.probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_probes_nothing() {
        let prober = ScriptedProber::new(Duration::from_millis(1));
        let outcome = validate(candidates(&names("up", 4)), 4, Instant::now(), prober.clone()).await;

        assert!(outcome.results.is_empty());
        assert!(outcome.timed_out);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
        assert!(outcome.errors[0].contains("0 of 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_probe_is_recorded_not_fatal() {
        let list = vec![
            "up0.example.com".to_string(),
            "panic.example.com".to_string(),
            "up1.example.com".to_string(),
        ];
        let outcome = validate(
            candidates(&list),
            2,
            Instant::now() + Duration::from_secs(60),
            ScriptedProber::new(Duration::from_millis(5)),
        )
        .await;

        assert_eq!(outcome.results.len(), 2);
        assert!(!outcome.timed_out);
        assert!(outcome
            .errors
            .iter()
            .any(|e| e.contains("Probe of panic.example.com failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_is_idempotent() {
        let mut list = names("up", 7);
        list.extend(names("down", 7));
        let run = || {
            validate(
                candidates(&list),
                4,
                Instant::now() + Duration::from_secs(60),
                ScriptedProber::new(Duration::from_millis(20)),
            )
        };

        let first = run().await;
        let second = run().await;

        let classes = |o: &ValidationOutcome| {
            o.results
                .iter()
                .map(|r| (r.hostname.clone(), r.classification))
                .collect::<Vec<_>>()
        };
        assert_eq!(classes(&first), classes(&second));
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let outcome = validate(
            candidates(&[]),
            5,
            Instant::now() + Duration::from_secs(1),
            ScriptedProber::new(Duration::ZERO),
        )
        .await;
        assert!(outcome.results.is_empty());
        assert!(outcome.errors.is_empty());
        assert!(!outcome.timed_out);
    }
}
