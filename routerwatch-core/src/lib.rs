//! `RouterWatch` Core Library
//!
//! This crate polls a home router over SSH, parses its plain-text status
//! output into structured metrics, and republishes them on a fixed schedule.
//!
//! # Crate Structure
//!
//! - [`session`] - Remote shell session, transport trait, and the `ssh2` transport
//! - [`monitoring`] - Status parsers, snapshot builder, and the poll scheduler
//! - [`control`] - Control actions (reboot) over the shared session
//! - [`monitor`] - `RouterMonitor` lifecycle: setup, refresh, shutdown
//! - [`config`] - `routerwatch.toml` settings and persistence
//! - [`tracing`] - Subscriber setup and span names
//! - [`testing`] - Scripted transport and router output fixtures

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod control;
pub mod error;
pub mod monitor;
pub mod monitoring;
pub mod session;
pub mod testing;
pub mod tracing;

pub use config::{ConfigManager, RouterSettings};
pub use error::{
    ConfigError, ConfigResult, MonitoringError, MonitoringResult, PollFailure, RouterWatchError,
    RouterWatchResult, SessionError, SessionResult,
};
pub use monitor::{MonitorParams, RouterMonitor, test_connection};
pub use monitoring::{
    MetricKey, MetricValue, MetricsParser, PollResult, PollScheduler, PollState, SnapshotBuilder,
    SystemSnapshot,
};
pub use session::{RemoteEndpoint, RemoteSession, SessionHandle, SessionState, SessionTimeouts};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, init_tracing,
    span_names,
};
