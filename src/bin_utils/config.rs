use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    /// Print every account's transaction history after the account report.
    pub print_history: bool,
}

impl Config {
    /// Builds the configuration from process arguments, program name excluded:
    /// `<commands.csv> [--history]`.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut input = None;
        let mut print_history = false;
        for arg in args {
            if arg == "--history" {
                print_history = true;
            } else if arg.starts_with("--") {
                anyhow::bail!("Unknown flag `{arg}`");
            } else if input.is_some() {
                anyhow::bail!("Unexpected argument `{arg}`");
            } else {
                input = Some(PathBuf::from(arg));
            }
        }
        Ok(Self {
            input: input.context("Expected a file name as the first argument")?,
            print_history,
        })
    }
}
