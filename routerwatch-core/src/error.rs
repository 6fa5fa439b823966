//! Error types for `RouterWatch`
//!
//! Each layer of the polling pipeline has its own error enum so that
//! failures can be downgraded at the right granularity: parse failures
//! become field defaults, session failures become cycle failures, and
//! cycle failures become published [`PollResult::Failure`] values.
//!
//! [`PollResult::Failure`]: crate::monitoring::PollResult::Failure

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use crate::monitoring::{MonitoringError, MonitoringResult};

/// Errors raised by the remote shell session and its transport
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session could not be established (network or authentication)
    #[error("Failed to connect to {host}:{port}")]
    Connect {
        /// Router hostname or IP
        host: String,
        /// SSH port
        port: u16,
    },

    /// Password authentication was rejected by the router
    #[error("Authentication failed for {username}@{host}")]
    Authentication {
        /// Router hostname or IP
        host: String,
        /// Username that was rejected
        username: String,
    },

    /// The router presented a host key that differs from the stored one
    #[error("Host key for {host} does not match the known_hosts entry")]
    HostKeyMismatch {
        /// Router hostname or IP
        host: String,
    },

    /// Low-level SSH or socket failure
    #[error("SSH transport error: {0}")]
    Transport(String),

    /// A command could not be executed or its output could not be read
    #[error("Command '{command}' failed: {reason}")]
    Execution {
        /// The command that was being executed
        command: String,
        /// Transport-level reason
        reason: String,
    },

    /// The blocking worker running session I/O panicked or was cancelled
    #[error("Session worker failed: {0}")]
    Worker(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<ssh2::Error> for SessionError {
    fn from(err: ssh2::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Reason a poll cycle failed as a whole
///
/// Field-level problems never produce a `PollFailure`; only failures that
/// prevent a snapshot from being built at all do.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PollFailure {
    /// The remote session could not be established
    #[error("Could not connect to router at {0}")]
    Connect(String),

    /// The cycle failed for another reason (worker panic, transport error)
    #[error("Poll cycle failed: {0}")]
    Unexpected(String),
}

impl From<SessionError> for PollFailure {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Connect { host, port } => Self::Connect(format!("{host}:{port}")),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The settings file could not be read or written
    #[error("Failed to access {path}: {source}")]
    Io {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`RouterSettings`]
    ///
    /// [`RouterSettings`]: crate::config::RouterSettings
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// A required value is missing or invalid
    #[error("Invalid setting '{field}': {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error type for `RouterWatch`
#[derive(Debug, Error)]
pub enum RouterWatchError {
    /// Remote session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The mandatory first refresh during setup did not succeed
    #[error("Initial refresh failed: {0}")]
    FirstRefresh(PollFailure),
}

/// Result type alias using [`RouterWatchError`]
pub type RouterWatchResult<T> = Result<T, RouterWatchError>;
