use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use cli::Cli;
use dispatch::{Dispatcher, Outcome};
use probe::{HttpFetcher, Probe};
use report::{ConsoleReporter, print_findings};

pub mod aggregate;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod probe;
pub mod report;
pub mod target;
pub mod wordlist;

pub use error::{Error, Result};

/// Exit status of a process ended by a second interrupt.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tracing::instrument(skip_all)]
pub async fn run(args: &Cli) -> anyhow::Result<Outcome> {
    let domain = args
        .domain
        .clone()
        .context("a target domain is required")?;

    println!(
        "{} Starting subdomain enumeration for {}",
        "[INFO]".blue(),
        domain
    );
    println!(
        "{} Using {} threads with {}s timeout",
        "[INFO]".blue(),
        args.threads,
        args.timeout
    );

    let candidates = wordlist::load_candidates(&args.file).await?;
    println!(
        "{} Loaded {} subdomains from {}",
        "[INFO]".blue(),
        candidates.len(),
        args.file.display()
    );

    let probe = Probe::new(HttpFetcher::new()?, domain, args.timeout())?;

    let cancel = CancellationToken::new();
    tokio::spawn(handle_interrupts(tokio::signal::ctrl_c, cancel.clone(), || {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }));

    let dispatcher = Dispatcher::new(probe, Arc::new(ConsoleReporter), args.dispatch_config())?
        .with_cancellation(cancel);
    let outcome = dispatcher.run(candidates).await?;

    wordlist::write_findings(&args.output, &outcome.findings).await?;
    println!(
        "{} Results saved to {}",
        "[INFO]".blue(),
        args.output.display()
    );
    print_findings(&outcome.findings);

    Ok(outcome)
}

/// The first interrupt stops handing out candidates and lets probes in flight
/// finish. A second one calls `abort` right away.
async fn handle_interrupts<S, Fut>(
    mut interrupted: S,
    cancel: CancellationToken,
    abort: impl FnOnce(),
) where
    S: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupted().await.is_err() {
        return;
    }
    warn!("interrupted, waiting for in-flight probes (interrupt again to quit)");
    cancel.cancel();

    if interrupted().await.is_ok() {
        warn!("interrupted again, exiting");
        abort();
    }
}
