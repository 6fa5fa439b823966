//! Command handler modules for the CLI.

mod completions;
mod config;
mod devices;
mod interfaces;
mod reboot;
mod status;
mod watch;

use std::path::Path;

use routerwatch_core::monitor::MonitorParams;
use routerwatch_core::monitoring::{PollResult, PollScheduler, SystemSnapshot};

use crate::cli::{Commands, RouterArgs};
use crate::error::CliError;
use crate::util::create_runtime;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    router: &RouterArgs,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Status { format } => status::cmd_status(config_path, router, format),
        Commands::Devices { format } => devices::cmd_devices(config_path, router, format),
        Commands::Interfaces { format } => interfaces::cmd_interfaces(config_path, router, format),
        Commands::Watch {
            interval,
            count,
            format,
        } => watch::cmd_watch(config_path, router, interval, count, format),
        Commands::Reboot { yes } => reboot::cmd_reboot(config_path, router, yes),
        Commands::Test => test::cmd_test(config_path, router),
        Commands::Config(subcmd) => config::cmd_config(config_path, router, subcmd),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}

/// Runs a single poll cycle and returns its snapshot
fn poll_once(params: &MonitorParams) -> Result<SystemSnapshot, CliError> {
    let runtime = create_runtime()?;
    let scheduler = PollScheduler::new(params.ssh_session(), params.interval);

    match runtime.block_on(scheduler.refresh()) {
        PollResult::Success { snapshot, .. } => Ok(snapshot),
        PollResult::Failure { reason, .. } => Err(CliError::Poll(reason)),
    }
}
