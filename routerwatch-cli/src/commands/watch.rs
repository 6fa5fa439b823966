//! Scheduled polling command.

use std::num::NonZeroUsize;
use std::path::Path;

use routerwatch_core::config::PollingSettings;
use routerwatch_core::monitor::{MonitorParams, RouterMonitor};
use routerwatch_core::monitoring::PollResult;

use crate::cli::{OutputFormat, RouterArgs};
use crate::error::CliError;
use crate::util::{create_runtime, monitor_params};

/// Watch command handler
pub fn cmd_watch(
    config_path: Option<&Path>,
    router: &RouterArgs,
    interval: Option<u64>,
    count: Option<NonZeroUsize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut params = monitor_params(config_path, router)?;
    if let Some(interval_secs) = interval {
        params.interval = PollingSettings { interval_secs }.interval();
    }

    let runtime = create_runtime()?;
    runtime.block_on(run_watch(&params, count, format))
}

/// Prints the first result, then every published one until `count`
/// results have been shown or the user interrupts
async fn run_watch(
    params: &MonitorParams,
    count: Option<NonZeroUsize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let monitor = RouterMonitor::setup(params).await?;
    let mut updates = monitor.subscribe();
    let limit_reached = |shown: usize| count.is_some_and(|limit| shown >= limit.get());
    let mut shown = 0usize;

    if let Some(result) = monitor.last_result() {
        println!("{}", format_result(&result, format)?);
        shown += 1;
    }

    let outcome = loop {
        if limit_reached(shown) {
            break Ok(());
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(result) = latest {
                    match format_result(&result, format) {
                        Ok(line) => println!("{line}"),
                        Err(e) => break Err(e),
                    }
                    shown += 1;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break Ok(());
            }
        }
    };

    monitor.shutdown().await;
    outcome
}

/// Format one poll result as a single line
///
/// # Errors
///
/// Returns `CliError::Output` if JSON serialization fails.
pub fn format_result(result: &PollResult, format: OutputFormat) -> Result<String, CliError> {
    if format == OutputFormat::Json {
        return serde_json::to_string(result)
            .map_err(|e| CliError::Output(format!("Failed to serialize to JSON: {e}")));
    }

    let time = result.timestamp().format("%Y-%m-%d %H:%M:%S");
    Ok(match result {
        PollResult::Success { snapshot, .. } => format!(
            "{time}  ok    load {:.2} {:.2} {:.2}  mem {:.1}%  up {}  devices {}",
            snapshot.cpu_load_1,
            snapshot.cpu_load_5,
            snapshot.cpu_load_15,
            snapshot.memory_percent_used,
            snapshot.uptime_display,
            snapshot.connected_devices_count
        ),
        PollResult::Failure { reason, .. } => format!("{time}  fail  {reason}"),
    })
}
