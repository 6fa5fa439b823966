//! `RouterWatch` CLI - Command-line interface for `RouterWatch`
//!
//! Polls a home router over SSH and prints its system status, connected
//! devices, and interface counters, either once or on a schedule. Also
//! provides a connection test, the reboot action, and settings management.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use routerwatch_core::tracing::{TracingConfig, TracingLevel, init_tracing};

/// Environment variable holding a custom log filter
const LOG_FILTER_ENV: &str = "RUST_LOG";

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    init_logging(cli.verbose, cli.quiet);

    let result = commands::dispatch(config_path, &cli.router, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Maps `-v`/`-q` to a log level and installs the subscriber on stderr
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => TracingLevel::Error,
        (false, 0) => TracingLevel::Warn,
        (false, 1) => TracingLevel::Info,
        (false, 2) => TracingLevel::Debug,
        (false, _) => TracingLevel::Trace,
    };

    let mut config = TracingConfig::new()
        .with_level(level)
        .with_span_events(verbose >= 2);
    if let Some(filter) = std::env::var(LOG_FILTER_ENV).ok().filter(|f| !f.is_empty()) {
        config = config.with_filter(filter);
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}
