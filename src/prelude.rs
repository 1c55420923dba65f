pub use clap::{CommandFactory, Parser};

pub use crate::cli::Cli;
pub use crate::run;
pub use crate::wordlist::create_sample;
