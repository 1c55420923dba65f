use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::probe::ProbeResult;

/// Counters of one run, always copied out of the aggregator as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    pub total: usize,
    pub checked: usize,
    pub found: usize,
    pub started: Instant,
}

impl RunStatistics {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a single [`Aggregator::record`] call did.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Recorded {
    /// Statistics right after this result was counted.
    pub stats: RunStatistics,
    /// `true` if the result was added to the findings.
    pub appended: bool,
}

#[derive(Debug)]
struct Ledger {
    stats: RunStatistics,
    findings: Vec<ProbeResult>,
    seen: HashSet<String>,
}

/// Synchronized ledger of one run.
///
/// Findings are kept in the order `record` was called, which is the order
/// probes completed in, not the order of the wordlist. Every update happens
/// under one lock that is never held across an await point.
#[derive(Debug)]
pub(crate) struct Aggregator {
    ledger: Mutex<Ledger>,
}

impl Aggregator {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                stats: RunStatistics {
                    total,
                    checked: 0,
                    found: 0,
                    started: Instant::now(),
                },
                findings: Vec::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Counts one completed candidate.
    ///
    /// Must be called at most `total` times, once per claimed candidate.
    pub(crate) fn record(&self, result: &ProbeResult) -> Recorded {
        // the ledger is consistent after every statement, so a poisoned lock is still usable
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);

        ledger.stats.checked += 1;
        debug_assert!(ledger.stats.checked <= ledger.stats.total);

        let appended = result.is_active() && ledger.seen.insert(result.hostname.clone());
        if appended {
            ledger.stats.found += 1;
            ledger.findings.push(result.clone());
        }

        Recorded {
            stats: ledger.stats,
            appended,
        }
    }

    pub(crate) fn snapshot(&self) -> RunStatistics {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stats
    }

    /// Takes the findings out of the ledger, leaving it empty.
    pub(crate) fn finish(&self) -> (Vec<ProbeResult>, RunStatistics) {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let findings = std::mem::take(&mut ledger.findings);
        (findings, ledger.stats)
    }
}
