use std::fs::File;

use anyhow::{Context, Result};
use mini_ledger::bin_utils::{CommandError, Service, config::Config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_args(std::env::args().skip(1))?;
    let file = File::open(&config.input)
        .with_context(|| format!("Failed to open `{}`", config.input.display()))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        print_history: config.print_history,
        error_printer: Box::new(|line, err| match err {
            CommandError::Rejected(err) => {
                tracing::warn!(line, kind = ?err.kind(), "{err}")
            }
            err => tracing::error!(line, "{err}"),
        }),
    };
    service.run()
}
