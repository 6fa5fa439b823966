//! Tracing integration for structured logging
//!
//! Installs the `tracing` subscriber for routerwatch binaries and names the
//! spans opened around poll cycles, connection tests and control actions.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Errors that can occur while installing the subscriber
#[derive(Debug, Error)]
pub enum TracingError {
    /// The filter string did not parse or the subscriber refused to install
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// `init_tracing` already ran in this process
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Verbosity applied to the routerwatch crates when no filter is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Adds informational events
    #[default]
    Info,
    /// Adds per-command detail
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream the formatted events are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Keeps stdout free for command output
    #[default]
    Stderr,
}

impl TracingOutput {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Subscriber settings, assembled with the `with_*` builder methods
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Level used when `filter` is unset
    pub level: TracingLevel,
    /// Destination stream
    pub output: TracingOutput,
    /// Log a line with busy/idle timings when a span closes
    pub include_span_events: bool,
    /// `EnvFilter` directives replacing the level-derived default
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Creates a configuration logging at info level to stderr
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the destination stream
    #[must_use]
    pub const fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables span close events
    #[must_use]
    pub const fn with_span_events(mut self, include: bool) -> Self {
        self.include_span_events = include;
        self
    }

    /// Replaces the level-derived directives
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> TracingResult<EnvFilter> {
        let directives = self
            .filter
            .clone()
            .unwrap_or_else(|| default_directives(self.level));
        EnvFilter::try_new(directives)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Installs the global subscriber described by `config`
///
/// # Errors
///
/// Returns `AlreadyInitialized` on a second call, and
/// `InitializationFailed` when the filter does not parse or another
/// subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_span_events(config.span_events())
                .with_writer(config.output.make_writer()),
        )
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, filter = ?config.filter, "Tracing initialized");
    Ok(())
}

/// Filter directives enabling `level` for the routerwatch crates only
#[must_use]
pub fn default_directives(level: TracingLevel) -> String {
    format!("routerwatch_core={level},routerwatch_cli={level}")
}

/// Opens an info-level span named by one of the [`span_names`] constants
///
/// ```ignore
/// let span = trace_operation!(span_names::POLL_CYCLE, host = %address);
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Span names, `category.operation`
pub mod span_names {
    /// Connect, build a snapshot, disconnect
    pub const POLL_CYCLE: &str = "poll.cycle";
    /// Lifetime of the periodic poll task
    pub const POLL_TIMER: &str = "poll.timer";
    /// Connection test
    pub const SESSION_TEST: &str = "session.test";
    /// Reboot request
    pub const CONTROL_REBOOT: &str = "control.reboot";
    /// Connection test plus the first refresh
    pub const MONITOR_SETUP: &str = "monitor.setup";
    /// Reading the config file
    pub const CONFIG_LOAD: &str = "config.load";
    /// Writing the config file
    pub const CONFIG_SAVE: &str = "config.save";
}
