use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::{Aggregator, Recorded, RunStatistics};
use crate::error::{Error, Result};
use crate::probe::{Fetch, Probe, ProbeResult};
use crate::report::{Report, Summary};
use crate::target::Candidate;

pub const DEFAULT_CONCURRENCY: usize = 50;
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum number of candidates probed at the same time.
    pub concurrency: usize,
    /// Emit a progress event every this many completions.
    pub progress_every: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl DispatchConfig {
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidConcurrency);
        }
        if self.progress_every == 0 {
            return Err(Error::InvalidProgressInterval);
        }
        Ok(())
    }
}

/// Everything a run produced once it reached completion.
#[derive(Debug)]
pub struct Outcome {
    /// Active results in completion order.
    pub findings: Vec<ProbeResult>,
    pub stats: RunStatistics,
    /// `true` if the run was cancelled before every candidate was claimed.
    pub cancelled: bool,
}

/// Candidates not yet claimed by a worker.
///
/// Claiming bumps a single atomic index, so each candidate goes to exactly one worker.
struct WorkQueue {
    candidates: Box<[Candidate]>,
    next: AtomicUsize,
    drained: AtomicBool,
}

impl WorkQueue {
    fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: candidates.into_boxed_slice(),
            next: AtomicUsize::new(0),
            drained: AtomicBool::new(false),
        }
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn claim(&self) -> Option<&Candidate> {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.candidates.get(i)
    }

    /// Returns `true` for the first caller only.
    fn mark_drained(&self) -> bool {
        !self.drained.swap(true, Ordering::Relaxed)
    }
}

/// State shared by all workers of one run.
struct Shared<F, R> {
    probe: Arc<Probe<F>>,
    reporter: Arc<R>,
    queue: WorkQueue,
    aggregator: Aggregator,
    cancel: CancellationToken,
    progress_every: usize,
}

/// Feeds every candidate to a bounded pool of probe workers.
pub struct Dispatcher<F, R> {
    probe: Arc<Probe<F>>,
    reporter: Arc<R>,
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl<F: Fetch, R: Report> Dispatcher<F, R> {
    pub fn new(probe: Probe<F>, reporter: Arc<R>, config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            probe: Arc::new(probe),
            reporter,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Stops handing out candidates once `cancel` fires.
    /// Probes already in flight still run to completion.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Probes every candidate exactly once and waits for all of them.
    ///
    /// Workers pull the next unclaimed candidate as soon as they are done with
    /// the previous one, so slow hosts do not hold up a fixed share of the list.
    #[tracing::instrument(skip_all, fields(domain = %self.probe.domain()))]
    pub async fn run(&self, candidates: Vec<Candidate>) -> Result<Outcome> {
        if candidates.is_empty() {
            return Err(Error::NoCandidates);
        }

        let queue = WorkQueue::new(candidates);
        let workers = self.config.concurrency.min(queue.len());
        info!(
            candidates = queue.len(),
            workers,
            timeout = ?self.probe.timeout(),
            "dispatching probes"
        );

        let shared = Arc::new(Shared {
            probe: self.probe.clone(),
            reporter: self.reporter.clone(),
            aggregator: Aggregator::new(queue.len()),
            queue,
            cancel: self.cancel.clone(),
            progress_every: self.config.progress_every,
        });

        let mut join_set = JoinSet::new();
        for _ in 0..workers {
            join_set.spawn(work(shared.clone()));
        }

        // join everything before surfacing a failure, nothing is left running
        let mut failure = None;
        while let Some(res) = join_set.join_next().await {
            if let Err(e) = res {
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            return Err(e.into());
        }

        let (findings, stats) = shared.aggregator.finish();
        let cancelled = self.cancel.is_cancelled() && stats.checked < stats.total;

        self.reporter.summary(&Summary::new(&stats, cancelled));
        info!(
            checked = stats.checked,
            found = stats.found,
            cancelled,
            "run complete"
        );

        Ok(Outcome {
            findings,
            stats,
            cancelled,
        })
    }
}

async fn work<F: Fetch, R: Report>(shared: Arc<Shared<F, R>>) {
    while !shared.cancel.is_cancelled() {
        let Some(candidate) = shared.queue.claim() else {
            if shared.queue.mark_drained() {
                let stats = shared.aggregator.snapshot();
                debug!(
                    checked = stats.checked,
                    total = stats.total,
                    "work queue drained, waiting for in-flight probes"
                );
            }
            break;
        };

        let result = shared.probe.probe(candidate).await;

        let Recorded { stats, appended } = shared.aggregator.record(&result);
        if appended {
            shared.reporter.found(&result);
        }
        if stats.checked == 1 || stats.checked % shared.progress_every == 0 {
            shared.reporter.progress(stats.checked, stats.total);
        }
    }
}
