//! Transport abstraction beneath [`RemoteSession`](super::RemoteSession)
//!
//! The session owns the connection state machine; a transport only knows how
//! to open a channel, run one command, and close. This keeps the state
//! handling testable without a live router.

use std::time::Duration;

use crate::error::SessionResult;

use super::RemoteEndpoint;

/// Raw output of a single remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Bytes written to stdout
    pub stdout: Vec<u8>,
    /// Bytes written to stderr
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Creates output with the given stdout and empty stderr
    #[must_use]
    pub fn stdout(text: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: text.into(),
            stderr: Vec::new(),
        }
    }
}

/// Timeouts applied by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Maximum time to establish TCP, handshake, and authenticate
    pub connect: Duration,
    /// Maximum time for a single command to complete
    pub command: Duration,
}

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-command execution timeout in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            command: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

/// A blocking remote-shell transport
///
/// Implementations are driven from a blocking worker thread and are never
/// used from two threads at once; the owning session serialises access.
pub trait RemoteTransport: Send {
    /// Opens and authenticates a connection to `endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if the network, handshake, host key check, or
    /// authentication fails.
    fn open(&mut self, endpoint: &RemoteEndpoint, timeouts: &SessionTimeouts) -> SessionResult<()>;

    /// Executes `command` on the open connection
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Execution`](crate::error::SessionError::Execution)
    /// if the channel cannot be opened or its output cannot be read within
    /// `timeout`.
    fn exec(&mut self, command: &str, timeout: Duration) -> SessionResult<CommandOutput>;

    /// Closes the connection; calling it when already closed is a no-op
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying channel refuses to close cleanly.
    fn close(&mut self) -> SessionResult<()>;
}
