//! CLI error types and exit codes.

use routerwatch_core::error::{ConfigError, PollFailure, RouterWatchError, SessionError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the router could not be reached or did not
    /// answer a poll
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection test failed
    #[error("Connection test failed: {0}")]
    TestFailed(String),

    /// Poll cycle failed
    #[error("Poll failed: {0}")]
    Poll(PollFailure),

    /// Control action failed
    #[error("Control action failed: {0}")]
    Control(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Output could not be produced
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RouterWatchError> for CliError {
    fn from(err: RouterWatchError) -> Self {
        match err {
            RouterWatchError::Config(e) => e.into(),
            RouterWatchError::Session(e) => Self::Connection(e.to_string()),
            RouterWatchError::FirstRefresh(reason) => Self::Poll(reason),
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, control, output, IO)
    /// - 2: Connection failure (test failed, router unreachable)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TestFailed(_) | Self::Connection(_) | Self::Poll(PollFailure::Connect(_)) => {
                exit_codes::CONNECTION_FAILURE
            }
            Self::Config(_)
            | Self::Poll(PollFailure::Unexpected(_))
            | Self::Control(_)
            | Self::Output(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
