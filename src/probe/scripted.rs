//! In-memory [`Fetch`] used by the probe and dispatch tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Attempt, Fetch};

#[derive(Debug, Default)]
struct State {
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Answers from a fixed table; unknown URLs are unreachable.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedFetcher {
    replies: HashMap<String, Attempt>,
    panics_on: Option<String>,
    latency: Duration,
    state: Arc<State>,
}

impl ScriptedFetcher {
    pub(crate) fn respond(mut self, url: &str, attempt: Attempt) -> Self {
        self.replies.insert(url.to_owned(), attempt);
        self
    }

    /// Makes every fetch of `url` panic.
    pub(crate) fn panic_on(mut self, url: &str) -> Self {
        self.panics_on = Some(url.to_owned());
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        let calls = self.state.calls.lock().unwrap();
        calls.get(url).copied().unwrap_or_default()
    }

    pub(crate) fn all_calls(&self) -> HashMap<String, usize> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Highest number of fetches that were running at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: String, _: Duration) -> Attempt {
        *self.state.calls.lock().unwrap().entry(url.clone()).or_default() += 1;

        if self.panics_on.as_deref() == Some(url.as_str()) {
            panic!("scripted failure for {url}");
        }

        let _guard = InFlight::enter(&self.state);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.replies
            .get(&url)
            .copied()
            .unwrap_or(Attempt::Unreachable)
    }
}

/// Keeps `in_flight` accurate even when the fetch is cancelled by a timeout.
struct InFlight<'a>(&'a State);

impl<'a> InFlight<'a> {
    fn enter(state: &'a State) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
