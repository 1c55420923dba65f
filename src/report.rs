use std::time::Duration;

use owo_colors::OwoColorize;

use crate::aggregate::RunStatistics;
use crate::probe::ProbeResult;

/// Final figures of a run that reached completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub checked: usize,
    pub found: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl Summary {
    pub fn new(stats: &RunStatistics, cancelled: bool) -> Self {
        Self {
            total: stats.total,
            checked: stats.checked,
            found: stats.found,
            elapsed: stats.elapsed(),
            cancelled,
        }
    }
}

/// Receives the live events of a run.
///
/// Called from the probe workers, never while the aggregator lock is held.
/// Workers report concurrently, so `found` calls may arrive in a different
/// order than the final findings list.
pub trait Report: Send + Sync + 'static {
    fn progress(&self, checked: usize, total: usize);

    fn found(&self, finding: &ProbeResult);

    fn summary(&self, summary: &Summary);
}

/// Prints events to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Report for ConsoleReporter {
    fn progress(&self, checked: usize, total: usize) {
        println!(
            "{} Checking {checked}/{total} subdomains...",
            "[PROGRESS]".blue()
        );
    }

    fn found(&self, finding: &ProbeResult) {
        println!("{} {finding}", "[FOUND]".green().bold());
    }

    fn summary(&self, summary: &Summary) {
        println!();
        if summary.cancelled {
            println!("{} Subdomain enumeration interrupted!", "[COMPLETE]".yellow());
        } else {
            println!("{} Subdomain enumeration finished!", "[COMPLETE]".green());
        }
        println!(
            "{} Time taken: {:.2} seconds",
            "[STATS]".cyan(),
            summary.elapsed.as_secs_f64()
        );
        println!(
            "{} Total subdomains checked: {}/{}",
            "[STATS]".cyan(),
            summary.checked,
            summary.total
        );
        println!(
            "{} Active subdomains found: {}",
            "[STATS]".cyan(),
            summary.found
        );
    }
}

/// Prints the discovered hosts once the run is over.
pub fn print_findings(findings: &[ProbeResult]) {
    if findings.is_empty() {
        return;
    }
    println!("\n{} Discovered subdomains:", "[SUMMARY]".purple());
    for finding in findings {
        println!("  → {finding}");
    }
}
