use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use crate::error::{Error, Result};
use crate::target::{Candidate, Domain};

pub(crate) mod http;

#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

/// What a single request against one URL came back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Any HTTP response, whatever its status.
    Responded(StatusCode),
    TimedOut,
    /// Connection refused, DNS failure, TLS failure and the like.
    Unreachable,
}

impl Attempt {
    fn active_status(self) -> Option<StatusCode> {
        match self {
            Attempt::Responded(status) if status.as_u16() < 400 => Some(status),
            _ => None,
        }
    }
}

/// Transport used by [`Probe`] to issue one request.
///
/// Implementations never fail: every network condition maps to an [`Attempt`].
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: String, timeout: Duration) -> impl Future<Output = Attempt> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Active { scheme: Scheme, status: StatusCode },
    Inactive,
}

/// Classifies the pair of attempts made for one candidate.
///
/// HTTPS wins when both schemes answer with a status below 400.
pub fn classify(https: Attempt, http: Attempt) -> Verdict {
    if let Some(status) = https.active_status() {
        return Verdict::Active {
            scheme: Scheme::Https,
            status,
        };
    }
    if let Some(status) = http.active_status() {
        return Verdict::Active {
            scheme: Scheme::Http,
            status,
        };
    }
    Verdict::Inactive
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub hostname: String,
    pub verdict: Verdict,
}

impl ProbeResult {
    pub fn is_active(&self) -> bool {
        matches!(self.verdict, Verdict::Active { .. })
    }

    pub fn scheme(&self) -> Option<Scheme> {
        match self.verdict {
            Verdict::Active { scheme, .. } => Some(scheme),
            Verdict::Inactive => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self.verdict {
            Verdict::Active { status, .. } => Some(status),
            Verdict::Inactive => None,
        }
    }
}

/// Renders a finding as `www.example.com - https://www.example.com (Status: 200)`.
impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Active { scheme, status } => write!(
                f,
                "{0} - {1}://{0} (Status: {2})",
                self.hostname,
                scheme,
                status.as_u16()
            ),
            Verdict::Inactive => write!(f, "{} - inactive", self.hostname),
        }
    }
}

pub struct Probe<F> {
    fetcher: F,
    domain: Domain,
    timeout: Duration,
}

impl<F: Fetch> Probe<F> {
    pub fn new(fetcher: F, domain: Domain, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::InvalidTimeout);
        }
        Ok(Self {
            fetcher,
            domain,
            timeout,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks `candidate` over HTTPS and HTTP at the same time.
    ///
    /// Both requests share the same deadline, so a candidate never takes much
    /// longer than the configured timeout to settle.
    #[tracing::instrument(level = "debug", skip_all, fields(candidate = %candidate))]
    pub async fn probe(&self, candidate: &Candidate) -> ProbeResult {
        let hostname = candidate.hostname(&self.domain);

        let (https, http) = tokio::join!(
            self.attempt(Scheme::Https, &hostname),
            self.attempt(Scheme::Http, &hostname),
        );

        ProbeResult {
            verdict: classify(https, http),
            hostname,
        }
    }

    async fn attempt(&self, scheme: Scheme, hostname: &str) -> Attempt {
        let url = format!("{scheme}://{hostname}");
        // transports are not trusted to honour the deadline on their own
        let attempt = tokio::time::timeout(self.timeout, self.fetcher.fetch(url, self.timeout))
            .await
            .unwrap_or(Attempt::TimedOut);

        debug!(%scheme, ?attempt, "attempt settled");
        attempt
    }
}
