//! Router status polling
//!
//! Parses the plain-text output of the router's status commands into typed
//! metrics, assembles them into a [`SystemSnapshot`], and refreshes that
//! snapshot on a schedule through a [`PollScheduler`].
//!
//! The parsers are pure functions; everything that talks to the router goes
//! through a shared [`crate::session::SessionHandle`].

mod keys;
mod metrics;
mod parser;
pub mod poller;
mod snapshot;

pub use keys::{Direction, MetricKey, MetricValue, UnknownMetricKey, units};
pub use metrics::{
    ConnectedDevice, InterfaceCounters, LoadAverage, MemoryStats, SystemSnapshot, UNKNOWN_UPTIME,
    Uptime, ZERO_MAC, percent_used,
};
pub use parser::{
    ARP_COMMAND, LOADAVG_COMMAND, MEMORY_COMMAND, MetricsParser, MonitoringError,
    MonitoringResult, NET_DEV_COMMAND, UPTIME_COMMAND,
};
pub use poller::{
    DEFAULT_POLL_INTERVAL, PollResult, PollScheduler, PollState, SchedulerHandle,
};
pub use snapshot::SnapshotBuilder;
