use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::error::{Error, Result};

// A single DNS label, matched against lowercase input:
//  1. 1 to 63 characters
//  2. alphanumerics, underscores and hyphens
//  3. hyphens can appear in the middle, but not at start/end
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // fail to compile regex is fatal since nothing can be validated without it
    Regex::new(r"^[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9_])?$").expect("failed to compile label regex")
});

/// Returns `true` if every dot-separated label of `name` is a valid DNS label.
/// Empty labels (leading, trailing or consecutive dots) are rejected.
fn valid_labels(name: &str) -> bool {
    name.split('.').all(|l| LABEL_RE.is_match(l))
}

/// The target domain every candidate is appended to, e.g. `example.com`.
///
/// Parsed from either a URL (`https://example.com/`) or a bare host name.
/// Scheme, path and a trailing dot are dropped; IP addresses and single-label
/// names are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDomain(s.to_owned());
        let trimmed = s.trim();

        let host = Url::parse(trimmed)
            .ok()
            .and_then(|u| u.host().map(|h| h.to_owned()))
            .or_else(|| Host::parse(trimmed.trim_end_matches('/')).ok())
            .ok_or_else(invalid)?;

        let Host::Domain(name) = host else {
            return Err(invalid());
        };

        let name = name.trim_end_matches('.').to_ascii_lowercase();
        if !name.contains('.') || !valid_labels(&name) {
            return Err(invalid());
        }

        Ok(Self(name))
    }
}

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One subdomain label read from the wordlist, e.g. `www` or `api.v2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate(String);

impl FromStr for Candidate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_ascii_lowercase();
        if valid_labels(&label) {
            Ok(Self(label))
        } else {
            Err(Error::InvalidLabel(s.to_owned()))
        }
    }
}

impl Candidate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully-qualified host name of this candidate under `domain`.
    pub fn hostname(&self, domain: &Domain) -> String {
        format!("{}.{}", self.0, domain.0)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
