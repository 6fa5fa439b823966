//! Parsers for router status command output
//!
//! Each parser handles the output of exactly one command. Column positions
//! follow the kernel's `/proc` formats and busybox `free` output and must
//! not be changed.
//!
//! Load average, memory, and uptime return an error on malformed input so
//! the snapshot builder can substitute the field default. Interface and
//! ARP tables are parsed line by line; malformed lines are skipped without
//! affecting the rest.

use std::collections::BTreeMap;

use super::metrics::{
    ConnectedDevice, InterfaceCounters, LoadAverage, MemoryStats, Uptime, ZERO_MAC,
};

/// Command producing load averages
pub const LOADAVG_COMMAND: &str = "cat /proc/loadavg";
/// Command producing memory totals in MB
pub const MEMORY_COMMAND: &str = "free -m";
/// Command producing seconds since boot
pub const UPTIME_COMMAND: &str = "cat /proc/uptime";
/// Command producing per-interface counters
pub const NET_DEV_COMMAND: &str = "cat /proc/net/dev";
/// Command producing the ARP neighbour table
pub const ARP_COMMAND: &str = "cat /proc/net/arp";

/// Header lines preceding interface rows in `/proc/net/dev`
const NET_DEV_HEADER_LINES: usize = 2;
/// Minimum whitespace-separated fields in a `/proc/net/dev` row
const NET_DEV_MIN_FIELDS: usize = 10;
/// Header lines preceding neighbour rows in `/proc/net/arp`
const ARP_HEADER_LINES: usize = 1;
/// Minimum whitespace-separated fields in a `/proc/net/arp` row
const ARP_MIN_FIELDS: usize = 6;

/// Errors that can occur during metrics parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitoringError {
    /// The command produced no output at all
    #[error("Empty output from '{command}'")]
    EmptyOutput {
        /// Command whose output was empty
        command: &'static str,
    },
    /// The output did not have the expected shape
    #[error("Failed to parse output of '{command}': {message}")]
    ParseError {
        /// Command whose output was malformed
        command: &'static str,
        /// What was wrong
        message: String,
    },
}

/// Result type for monitoring operations
pub type MonitoringResult<T> = Result<T, MonitoringError>;

fn parse_error(command: &'static str, message: impl Into<String>) -> MonitoringError {
    MonitoringError::ParseError {
        command,
        message: message.into(),
    }
}

fn first_line<'a>(output: &'a str, command: &'static str) -> MonitoringResult<&'a str> {
    output
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or(MonitoringError::EmptyOutput { command })
}

fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
    command: &'static str,
) -> MonitoringResult<T> {
    let raw = fields
        .get(index)
        .ok_or_else(|| parse_error(command, format!("missing column {}", index + 1)))?;
    raw.parse()
        .map_err(|_| parse_error(command, format!("invalid value '{raw}' in column {}", index + 1)))
}

/// Stateless parser for router status output
pub struct MetricsParser;

impl MetricsParser {
    /// Parses `/proc/loadavg`.
    ///
    /// Format: `0.15 0.22 0.10 1/234 5678`; only the first three tokens of
    /// the first line are used.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than three tokens or any of them
    /// is not a number.
    pub fn parse_loadavg(output: &str) -> MonitoringResult<LoadAverage> {
        let line = first_line(output, LOADAVG_COMMAND)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(parse_error(
                LOADAVG_COMMAND,
                format!("expected 3 load values, found {}", fields.len()),
            ));
        }

        Ok(LoadAverage {
            one: parse_field(&fields, 0, LOADAVG_COMMAND)?,
            five: parse_field(&fields, 1, LOADAVG_COMMAND)?,
            fifteen: parse_field(&fields, 2, LOADAVG_COMMAND)?,
        })
    }

    /// Parses `free -m`.
    ///
    /// The second line is the `Mem:` summary row; columns 2, 3, and 4 are
    /// total, used, and free megabytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary row is missing or its columns are
    /// not integers.
    pub fn parse_memory(output: &str) -> MonitoringResult<MemoryStats> {
        let row = output
            .lines()
            .nth(1)
            .ok_or_else(|| parse_error(MEMORY_COMMAND, "missing summary row"))?;
        let fields: Vec<&str> = row.split_whitespace().collect();

        let total = parse_field(&fields, 1, MEMORY_COMMAND)?;
        let used = parse_field(&fields, 2, MEMORY_COMMAND)?;
        let free = parse_field(&fields, 3, MEMORY_COMMAND)?;

        Ok(MemoryStats::new(total, used, free))
    }

    /// Parses `/proc/uptime`.
    ///
    /// Format: `90061.50 170000.12`; the first value is seconds since boot,
    /// truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the first token is not a finite, non-negative
    /// number.
    pub fn parse_uptime(output: &str) -> MonitoringResult<Uptime> {
        let line = first_line(output, UPTIME_COMMAND)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let seconds: f64 = parse_field(&fields, 0, UPTIME_COMMAND)?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(parse_error(
                UPTIME_COMMAND,
                format!("uptime out of range: {seconds}"),
            ));
        }

        Ok(Uptime::from_secs(seconds.trunc() as u64))
    }

    /// Parses `/proc/net/dev` into counters keyed by interface name.
    ///
    /// The two header lines are skipped. Rows with fewer than ten fields
    /// are skipped. Otherwise field 1 is the name (with trailing colon),
    /// fields 2 and 3 are rx bytes and packets, fields 10 and 11 are tx
    /// bytes and packets.
    ///
    /// # Errors
    ///
    /// Returns an error if a row lacks the tx packets column or carries a
    /// non-numeric counter; the whole table is then rejected.
    pub fn parse_interfaces(
        output: &str,
    ) -> MonitoringResult<BTreeMap<String, InterfaceCounters>> {
        let mut interfaces = BTreeMap::new();

        for line in output.lines().skip(NET_DEV_HEADER_LINES) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < NET_DEV_MIN_FIELDS {
                tracing::debug!(line, "Skipping short /proc/net/dev row");
                continue;
            }

            let name = fields[0].trim_end_matches(':').to_string();
            let counters = InterfaceCounters {
                rx_bytes: parse_field(&fields, 1, NET_DEV_COMMAND)?,
                rx_packets: parse_field(&fields, 2, NET_DEV_COMMAND)?,
                tx_bytes: parse_field(&fields, 9, NET_DEV_COMMAND)?,
                tx_packets: parse_field(&fields, 10, NET_DEV_COMMAND)?,
            };
            interfaces.insert(name, counters);
        }

        Ok(interfaces)
    }

    /// Parses `/proc/net/arp` into connected devices, in table order.
    ///
    /// Format: `IP HWtype Flags HWaddress Mask Device`. Rows with fewer than
    /// six fields and incomplete entries (all-zero MAC) are skipped.
    #[must_use]
    pub fn parse_arp_table(output: &str) -> Vec<ConnectedDevice> {
        output
            .lines()
            .skip(ARP_HEADER_LINES)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < ARP_MIN_FIELDS || fields[3] == ZERO_MAC {
                    return None;
                }
                Some(ConnectedDevice {
                    ip: fields[0].to_string(),
                    mac: fields[3].to_string(),
                    interface: fields[5].to_string(),
                })
            })
            .collect()
    }
}
