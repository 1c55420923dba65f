use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),
    #[error("invalid subdomain label: {0:?}")]
    InvalidLabel(String),
    #[error("wordlist line {line}: invalid subdomain label {label:?}")]
    WordlistEntry { line: usize, label: String },
    #[error("{}: wordlist contains no candidates", .0.display())]
    EmptyWordlist(PathBuf),
    #[error("no candidates to probe")]
    NoCandidates,
    #[error("concurrency must be greater than zero")]
    InvalidConcurrency,
    #[error("progress interval must be greater than zero")]
    InvalidProgressInterval,
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("probe worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
