use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::probe::ProbeResult;
use crate::target::Candidate;

pub const SAMPLE_LABELS: &[&str] = &[
    "www", "mail", "ftp", "admin", "test", "dev", "staging", "api", "blog", "shop", "store", "news",
    "support", "help", "docs", "portal", "app", "mobile", "secure", "login", "auth", "cpanel",
    "webmail", "pop", "smtp", "imap", "ns1", "ns2", "dns", "mx", "exchange", "autodiscover",
    "remote", "vpn", "ssl", "static", "media", "cdn", "assets", "img", "images", "video",
    "downloads", "files", "upload", "backup", "old", "new", "beta", "alpha", "demo", "preview",
    "sandbox", "qa", "uat",
];

/// Parses a wordlist, one label per line.
///
/// Surrounding whitespace is trimmed, blank lines and `#` comments are skipped,
/// and repeated labels are kept only at their first occurrence.
pub fn parse_candidates(text: &str) -> Result<Vec<Candidate>> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let candidate: Candidate = line.parse().map_err(|_| Error::WordlistEntry {
            line: i + 1,
            label: line.to_owned(),
        })?;

        if seen.insert(candidate.clone()) {
            candidates.push(candidate);
        }
    }

    Ok(candidates)
}

pub async fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

    let candidates = parse_candidates(&text)?;
    if candidates.is_empty() {
        return Err(Error::EmptyWordlist(path.to_owned()));
    }

    info!(count = candidates.len(), path = %path.display(), "loaded wordlist");
    Ok(candidates)
}

pub async fn create_sample(path: &Path) -> Result<usize> {
    let mut text = SAMPLE_LABELS.join("\n");
    text.push('\n');

    tokio::fs::write(path, text)
        .await
        .map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

    Ok(SAMPLE_LABELS.len())
}

/// Writes one rendered finding per line, replacing any previous content.
pub async fn write_findings(path: &Path, findings: &[ProbeResult]) -> Result<()> {
    let text: String = findings.iter().map(|f| format!("{f}\n")).collect();

    tokio::fs::write(path, text)
        .await
        .map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })
}
