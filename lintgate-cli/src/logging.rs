use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a default filter directive.
fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` wins over `-v`.
pub fn init(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(verbose >= 2)
        .try_init();

    // A subscriber may already be installed (tests); keep it.
    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}
