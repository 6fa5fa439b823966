//! Data models for router metrics
//!
//! Every field of a [`SystemSnapshot`] always carries a value: when a
//! command or parse fails the builder substitutes the defaults defined
//! here, so consumers never deal with missing fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Uptime text used when the uptime could not be read
pub const UNKNOWN_UPTIME: &str = "unknown";

/// MAC address the kernel reports for incomplete ARP entries
pub const ZERO_MAC: &str = "00:00:00:00:00:00";

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Load averages from `/proc/loadavg`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadAverage {
    /// 1-minute load average
    pub one: f64,
    /// 5-minute load average
    pub five: f64,
    /// 15-minute load average
    pub fifteen: f64,
}

/// Memory totals from `free -m`, in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total memory (MB)
    pub total_mb: u64,
    /// Used memory (MB)
    pub used_mb: u64,
    /// Free memory (MB)
    pub free_mb: u64,
    /// Used share of total, rounded to one decimal (0.0–100.0)
    pub percent_used: f64,
}

impl MemoryStats {
    /// Builds stats from the three `free -m` columns, deriving the
    /// percentage. A zero total yields exactly 0%.
    #[must_use]
    pub fn new(total_mb: u64, used_mb: u64, free_mb: u64) -> Self {
        Self {
            total_mb,
            used_mb,
            free_mb,
            percent_used: percent_used(used_mb, total_mb),
        }
    }
}

/// `used / total * 100`, rounded to one decimal (ties to even) and clamped
/// to 0–100
#[must_use]
pub fn percent_used(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = (used as f64 / total as f64) * 100.0;
    round_one_decimal(percent).clamp(0.0, 100.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Whole seconds since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Uptime {
    /// Seconds since boot (fraction truncated)
    pub seconds: u64,
}

impl Uptime {
    /// Wraps a number of seconds
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Complete days
    #[must_use]
    pub const fn days(&self) -> u64 {
        self.seconds / SECS_PER_DAY
    }

    /// Hours past the last complete day
    #[must_use]
    pub const fn hours(&self) -> u64 {
        (self.seconds % SECS_PER_DAY) / SECS_PER_HOUR
    }

    /// Minutes past the last complete hour
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        (self.seconds % SECS_PER_HOUR) / SECS_PER_MINUTE
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h {}m", self.days(), self.hours(), self.minutes())
    }
}

/// Cumulative counters for one network interface
///
/// Counters only grow; they reset when the router reboots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceCounters {
    /// Received bytes
    pub rx_bytes: u64,
    /// Received packets
    pub rx_packets: u64,
    /// Transmitted bytes
    pub tx_bytes: u64,
    /// Transmitted packets
    pub tx_packets: u64,
}

/// A neighbour from the router's ARP table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedDevice {
    /// IPv4 address
    pub ip: String,
    /// Hardware address
    pub mac: String,
    /// Interface the neighbour was seen on
    pub interface: String,
}

/// One complete set of metrics captured in a single poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// 1-minute load average
    pub cpu_load_1: f64,
    /// 5-minute load average
    pub cpu_load_5: f64,
    /// 15-minute load average
    pub cpu_load_15: f64,
    /// Total memory (MB)
    pub memory_total_mb: u64,
    /// Used memory (MB)
    pub memory_used_mb: u64,
    /// Free memory (MB)
    pub memory_free_mb: u64,
    /// Used memory percentage, one decimal
    pub memory_percent_used: f64,
    /// Seconds since boot
    pub uptime_seconds: u64,
    /// `"{d}d {h}h {m}m"`, or [`UNKNOWN_UPTIME`]
    pub uptime_display: String,
    /// Counters per interface, keyed by interface name
    pub interfaces: BTreeMap<String, InterfaceCounters>,
    /// ARP neighbours with a known hardware address
    pub connected_devices: Vec<ConnectedDevice>,
    /// Length of `connected_devices`
    pub connected_devices_count: usize,
}

impl SystemSnapshot {
    /// Assembles a snapshot from parsed parts.
    ///
    /// `uptime` is `None` when it could not be read; the display text then
    /// becomes [`UNKNOWN_UPTIME`].
    #[must_use]
    pub fn from_parts(
        load: LoadAverage,
        memory: MemoryStats,
        uptime: Option<Uptime>,
        interfaces: BTreeMap<String, InterfaceCounters>,
        connected_devices: Vec<ConnectedDevice>,
    ) -> Self {
        let (uptime_seconds, uptime_display) = match uptime {
            Some(uptime) => (uptime.seconds, uptime.to_string()),
            None => (0, UNKNOWN_UPTIME.to_string()),
        };

        Self {
            cpu_load_1: load.one,
            cpu_load_5: load.five,
            cpu_load_15: load.fifteen,
            memory_total_mb: memory.total_mb,
            memory_used_mb: memory.used_mb,
            memory_free_mb: memory.free_mb,
            memory_percent_used: memory.percent_used,
            uptime_seconds,
            uptime_display,
            interfaces,
            connected_devices_count: connected_devices.len(),
            connected_devices,
        }
    }

    /// Load averages as a struct
    #[must_use]
    pub const fn load_average(&self) -> LoadAverage {
        LoadAverage {
            one: self.cpu_load_1,
            five: self.cpu_load_5,
            fifteen: self.cpu_load_15,
        }
    }

    /// Memory figures as a struct
    #[must_use]
    pub const fn memory(&self) -> MemoryStats {
        MemoryStats {
            total_mb: self.memory_total_mb,
            used_mb: self.memory_used_mb,
            free_mb: self.memory_free_mb,
            percent_used: self.memory_percent_used,
        }
    }
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        Self::from_parts(
            LoadAverage::default(),
            MemoryStats::default(),
            None,
            BTreeMap::new(),
            Vec::new(),
        )
    }
}
