//! Interface counters command.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use routerwatch_core::monitoring::InterfaceCounters;

use crate::cli::{OutputFormat, RouterArgs};
use crate::error::CliError;
use crate::util::{monitor_params, to_json};

/// Interfaces command handler
pub fn cmd_interfaces(
    config_path: Option<&Path>,
    router: &RouterArgs,
    format: OutputFormat,
) -> Result<(), CliError> {
    let params = monitor_params(config_path, router)?;
    let snapshot = super::poll_once(&params)?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&snapshot.interfaces)),
        OutputFormat::Json => println!("{}", to_json(&snapshot.interfaces)?),
    }

    Ok(())
}

/// Format interface counters as a table string, one row per interface
#[must_use]
pub fn format_table(interfaces: &BTreeMap<String, InterfaceCounters>) -> String {
    if interfaces.is_empty() {
        return "No interfaces reported.".to_string();
    }

    let name_width = interfaces.keys().map(String::len).max().unwrap_or(9).max(9);
    let num_width = interfaces
        .values()
        .flat_map(|c| [c.rx_bytes, c.rx_packets, c.tx_bytes, c.tx_packets])
        .map(|n| n.to_string().len())
        .max()
        .unwrap_or(10)
        .max(10);

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<name_width$}  {:>num_width$}  {:>num_width$}  {:>num_width$}  {:>num_width$}",
        "INTERFACE", "RX BYTES", "RX PKTS", "TX BYTES", "TX PKTS"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:->num_width$}  {:->num_width$}  {:->num_width$}  {:->num_width$}",
        "", "", "", "", ""
    );
    for (name, counters) in interfaces {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:>num_width$}  {:>num_width$}  {:>num_width$}  {:>num_width$}",
            name, counters.rx_bytes, counters.rx_packets, counters.tx_bytes, counters.tx_packets
        );
    }

    output.trim_end().to_string()
}
