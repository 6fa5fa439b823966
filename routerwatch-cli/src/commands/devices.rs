//! Connected devices command.

use std::fmt::Write as _;
use std::path::Path;

use routerwatch_core::monitoring::ConnectedDevice;

use crate::cli::{OutputFormat, RouterArgs};
use crate::error::CliError;
use crate::util::{monitor_params, to_json};

/// Devices command handler
pub fn cmd_devices(
    config_path: Option<&Path>,
    router: &RouterArgs,
    format: OutputFormat,
) -> Result<(), CliError> {
    let params = monitor_params(config_path, router)?;
    let snapshot = super::poll_once(&params)?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&snapshot.connected_devices)),
        OutputFormat::Json => println!("{}", to_json(&snapshot.connected_devices)?),
    }

    Ok(())
}

/// Format ARP neighbours as a table string
#[must_use]
pub fn format_table(devices: &[ConnectedDevice]) -> String {
    if devices.is_empty() {
        return "No connected devices.".to_string();
    }

    let ip_width = devices.iter().map(|d| d.ip.len()).max().unwrap_or(2).max(2);
    let mac_width = 17;

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<ip_width$}  {:<mac_width$}  INTERFACE",
        "IP", "MAC"
    );
    let _ = writeln!(output, "{:-<ip_width$}  {:-<mac_width$}  {:-<9}", "", "", "");
    for device in devices {
        let _ = writeln!(
            output,
            "{:<ip_width$}  {:<mac_width$}  {}",
            device.ip, device.mac, device.interface
        );
    }
    let _ = write!(output, "\n{} device(s)", devices.len());

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use routerwatch_core::monitoring::MetricsParser;
    use routerwatch_core::testing::ARP_OUTPUT;

    #[test]
    fn test_table_lists_neighbours() {
        let devices = MetricsParser::parse_arp_table(ARP_OUTPUT);
        let table = format_table(&devices);

        assert!(table.contains("192.168.0.10"));
        assert!(table.contains("3c:22:fb:01:7a:e4"));
        assert!(!table.contains("192.168.0.99"));
        assert!(table.ends_with("2 device(s)"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_table(&[]), "No connected devices.");
    }
}
