//! Named metric keys for consumers that address snapshot fields one by one

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::metrics::SystemSnapshot;

/// Unit strings reported alongside metric values
pub mod units {
    /// Percentage
    pub const PERCENT: &str = "%";
    /// Megabytes
    pub const MEGABYTES: &str = "MB";
    /// Bytes
    pub const BYTES: &str = "B";
    /// Device count
    pub const DEVICES: &str = "devices";
}

const RX_SUFFIX: &str = "_rx_bytes";
const TX_SUFFIX: &str = "_tx_bytes";

/// Traffic direction of an interface counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Received
    Rx,
    /// Transmitted
    Tx,
}

/// Identifies one value in a [`SystemSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    /// 1-minute load average
    CpuLoad1,
    /// 5-minute load average
    CpuLoad5,
    /// 15-minute load average
    CpuLoad15,
    /// Used memory percentage
    MemoryPercentage,
    /// Used memory in MB
    MemoryUsed,
    /// Free memory in MB
    MemoryFree,
    /// Formatted uptime
    Uptime,
    /// Number of ARP neighbours
    ConnectedDevicesCount,
    /// Byte counter of one interface
    Interface {
        /// Interface name as reported by the router
        name: String,
        /// Counter direction
        direction: Direction,
    },
}

impl MetricKey {
    /// Keys present in every snapshot
    pub const FIXED: [Self; 8] = [
        Self::CpuLoad1,
        Self::CpuLoad5,
        Self::CpuLoad15,
        Self::MemoryPercentage,
        Self::MemoryUsed,
        Self::MemoryFree,
        Self::Uptime,
        Self::ConnectedDevicesCount,
    ];

    /// Fixed keys followed by RX and TX keys for every interface in
    /// `snapshot`, in interface-name order
    #[must_use]
    pub fn catalog(snapshot: &SystemSnapshot) -> Vec<Self> {
        let mut keys = Self::FIXED.to_vec();
        for name in snapshot.interfaces.keys() {
            keys.push(Self::Interface {
                name: name.clone(),
                direction: Direction::Rx,
            });
            keys.push(Self::Interface {
                name: name.clone(),
                direction: Direction::Tx,
            });
        }
        keys
    }

    /// Human-readable label
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::CpuLoad1 => "CPU Load 1 min".to_string(),
            Self::CpuLoad5 => "CPU Load 5 min".to_string(),
            Self::CpuLoad15 => "CPU Load 15 min".to_string(),
            Self::MemoryPercentage => "Memory Usage".to_string(),
            Self::MemoryUsed => "Memory Used".to_string(),
            Self::MemoryFree => "Memory Free".to_string(),
            Self::Uptime => "Uptime".to_string(),
            Self::ConnectedDevicesCount => "Connected Devices".to_string(),
            Self::Interface {
                name,
                direction: Direction::Rx,
            } => format!("{name} RX"),
            Self::Interface {
                name,
                direction: Direction::Tx,
            } => format!("{name} TX"),
        }
    }

    /// Unit of the value, if any
    #[must_use]
    pub const fn unit(&self) -> Option<&'static str> {
        match self {
            Self::CpuLoad1 | Self::CpuLoad5 | Self::CpuLoad15 | Self::Uptime => None,
            Self::MemoryPercentage => Some(units::PERCENT),
            Self::MemoryUsed | Self::MemoryFree => Some(units::MEGABYTES),
            Self::ConnectedDevicesCount => Some(units::DEVICES),
            Self::Interface { .. } => Some(units::BYTES),
        }
    }

    /// Whether the value only grows between router reboots
    #[must_use]
    pub const fn is_cumulative(&self) -> bool {
        matches!(self, Self::Interface { .. })
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CpuLoad1 => write!(f, "cpu_load_1"),
            Self::CpuLoad5 => write!(f, "cpu_load_5"),
            Self::CpuLoad15 => write!(f, "cpu_load_15"),
            Self::MemoryPercentage => write!(f, "memory_percentage"),
            Self::MemoryUsed => write!(f, "memory_used"),
            Self::MemoryFree => write!(f, "memory_free"),
            Self::Uptime => write!(f, "uptime"),
            Self::ConnectedDevicesCount => write!(f, "connected_devices_count"),
            Self::Interface {
                name,
                direction: Direction::Rx,
            } => write!(f, "{name}{RX_SUFFIX}"),
            Self::Interface {
                name,
                direction: Direction::Tx,
            } => write!(f, "{name}{TX_SUFFIX}"),
        }
    }
}

/// Error returned when a string names no metric
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown metric key: {0}")]
pub struct UnknownMetricKey(pub String);

impl FromStr for MetricKey {
    type Err = UnknownMetricKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(key) = Self::FIXED.iter().find(|key| key.to_string() == s) {
            return Ok(key.clone());
        }

        let interface = |name: &str, direction| {
            (!name.is_empty()).then(|| Self::Interface {
                name: name.to_string(),
                direction,
            })
        };

        s.strip_suffix(RX_SUFFIX)
            .and_then(|name| interface(name, Direction::Rx))
            .or_else(|| {
                s.strip_suffix(TX_SUFFIX)
                    .and_then(|name| interface(name, Direction::Tx))
            })
            .ok_or_else(|| UnknownMetricKey(s.to_string()))
    }
}

impl Serialize for MetricKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single metric value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Fractional measurement
    Float(f64),
    /// Count or size
    Integer(u64),
    /// Formatted text
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl SystemSnapshot {
    /// Looks up one value by key.
    ///
    /// Fixed keys always resolve; interface keys resolve only when the
    /// interface was present in this snapshot.
    #[must_use]
    pub fn value(&self, key: &MetricKey) -> Option<MetricValue> {
        let value = match key {
            MetricKey::CpuLoad1 => MetricValue::Float(self.cpu_load_1),
            MetricKey::CpuLoad5 => MetricValue::Float(self.cpu_load_5),
            MetricKey::CpuLoad15 => MetricValue::Float(self.cpu_load_15),
            MetricKey::MemoryPercentage => MetricValue::Float(self.memory_percent_used),
            MetricKey::MemoryUsed => MetricValue::Integer(self.memory_used_mb),
            MetricKey::MemoryFree => MetricValue::Integer(self.memory_free_mb),
            MetricKey::Uptime => MetricValue::Text(self.uptime_display.clone()),
            MetricKey::ConnectedDevicesCount => {
                MetricValue::Integer(self.connected_devices_count as u64)
            }
            MetricKey::Interface { name, direction } => {
                let counters = self.interfaces.get(name)?;
                MetricValue::Integer(match direction {
                    Direction::Rx => counters.rx_bytes,
                    Direction::Tx => counters.tx_bytes,
                })
            }
        };
        Some(value)
    }
}
