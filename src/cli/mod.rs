use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap_complete::Shell;
use owo_colors::OwoColorize;

use crate::dispatch::{DEFAULT_PROGRESS_EVERY, DispatchConfig};
use crate::target::Domain;

pub const BANNER: &str = r#"
              __                   __
   _______  __/ /_  ____  _________/ /_  ___
  / ___/ / / / __ \/ __ \/ ___/ __ \/ __ \/ _ \
 (__  ) /_/ / /_/ / /_/ / /  / /_/ / /_/ /  __/
/____/\__,_/_.___/ .___/_/   \____/_.___/\___/
                /_/
"#;

pub const WARNINGS: &str = r#"
WARNING:
[!] Only probe domains you are authorized to test.
[!] Developers assume no liability and are not responsible for any misuse or damage.
"#;

pub fn header() -> String {
    format!("{}\n{}", BANNER.purple(), WARNINGS.yellow())
}

/// Discover subdomains that answer over HTTP or HTTPS
///
/// Every label of the wordlist is prefixed to the target domain and probed
/// over both schemes. Hosts answering with a status below 400 are reported
/// and written to the output file.
#[derive(Parser, Debug)]
#[command(name = "subprobe")]
#[command(author, version, about, long_about)]
#[command(before_help = header(), before_long_help = header())]
#[command(arg_required_else_help = true)]
#[command(verbatim_doc_comment, propagate_version = true)]
pub struct Cli {
    /// Target domain, as a host name or URL (e.g. example.com)
    #[arg(required_unless_present_any = ["create_sample", "completions"])]
    pub domain: Option<Domain>,

    /// Wordlist with one subdomain label per line
    #[arg(short, long, default_value = "subdomains.txt")]
    pub file: PathBuf,

    /// File the discovered subdomains are written to
    #[arg(short, long, default_value = "discovered_subdomains.txt")]
    pub output: PathBuf,

    /// Number of subdomains probed at the same time
    #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..=1024))]
    pub threads: u16,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Write a sample wordlist to the `--file` path and exit
    #[arg(long)]
    pub create_sample: bool,

    /// Print a completion script for the given shell and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Show diagnostic logs
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            concurrency: usize::from(self.threads),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["subprobe", "https://example.com/"]).unwrap();

        assert_eq!(cli.domain.unwrap().as_str(), "example.com");
        assert_eq!(cli.file, PathBuf::from("subdomains.txt"));
        assert_eq!(cli.output, PathBuf::from("discovered_subdomains.txt"));
        assert_eq!(cli.threads, 50);
        assert_eq!(cli.timeout, 5);
        assert!(!cli.create_sample);
    }

    #[test]
    fn test_create_sample_without_domain() {
        let cli =
            Cli::try_parse_from(["subprobe", "--create-sample", "-f", "words.txt"]).unwrap();

        assert!(cli.create_sample);
        assert!(cli.domain.is_none());
        assert_eq!(cli.file, PathBuf::from("words.txt"));
    }

    #[rstest]
    #[case::zero_threads(&["subprobe", "example.com", "-t", "0"])]
    #[case::too_many_threads(&["subprobe", "example.com", "-t", "5000"])]
    #[case::zero_timeout(&["subprobe", "example.com", "--timeout", "0"])]
    #[case::bad_domain(&["subprobe", "not a domain"])]
    #[case::ip_address(&["subprobe", "127.0.0.1"])]
    #[case::missing_domain(&["subprobe", "-t", "10"])]
    fn test_rejects_invalid_input(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_dispatch_config() {
        let cli = Cli::try_parse_from(["subprobe", "example.com", "-t", "8", "--timeout", "2"])
            .unwrap();

        assert_eq!(cli.dispatch_config().concurrency, 8);
        assert_eq!(cli.timeout(), Duration::from_secs(2));
    }
}
