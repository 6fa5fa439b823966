//! Remote shell session to the router
//!
//! A [`RemoteSession`] owns one connection to one endpoint and tracks its
//! state. It is not thread-safe; all use goes through a [`SessionHandle`],
//! which keeps the session behind a single mutex and runs every blocking
//! operation on the tokio blocking pool.

mod ssh;
mod transport;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;

use crate::error::{SessionError, SessionResult};

pub use ssh::Ssh2Transport;
pub use transport::{
    CommandOutput, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, RemoteTransport,
    SessionTimeouts,
};

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Address and credentials of a router's SSH service
#[derive(Clone)]
pub struct RemoteEndpoint {
    /// Hostname or IP address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Login password
    pub password: SecretString,
}

impl RemoteEndpoint {
    /// Creates an endpoint on the default SSH port
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Sets the SSH port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port` for log messages
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Connection state of a [`RemoteSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection is open
    #[default]
    Disconnected,
    /// Authenticated and ready for commands
    Connected,
    /// The last connection attempt failed
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single stateful remote-shell session
pub struct RemoteSession {
    endpoint: RemoteEndpoint,
    timeouts: SessionTimeouts,
    transport: Box<dyn RemoteTransport>,
    state: SessionState,
}

impl RemoteSession {
    /// Creates a disconnected session
    #[must_use]
    pub fn new(
        endpoint: RemoteEndpoint,
        timeouts: SessionTimeouts,
        transport: Box<dyn RemoteTransport>,
    ) -> Self {
        Self {
            endpoint,
            timeouts,
            transport,
            state: SessionState::Disconnected,
        }
    }

    /// Creates a session using the SSH transport
    #[must_use]
    pub fn ssh(
        endpoint: RemoteEndpoint,
        timeouts: SessionTimeouts,
        known_hosts_path: Option<std::path::PathBuf>,
    ) -> Self {
        Self::new(
            endpoint,
            timeouts,
            Box::new(Ssh2Transport::new(known_hosts_path)),
        )
    }

    /// The endpoint this session talks to
    #[must_use]
    pub const fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// Current connection state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is authenticated and usable
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Opens the session, replacing any existing connection.
    ///
    /// Returns `false` on any failure; the cause is logged rather than
    /// returned.
    pub fn connect(&mut self) -> bool {
        if self.is_connected() {
            self.close_transport();
        }

        match self.transport.open(&self.endpoint, &self.timeouts) {
            Ok(()) => {
                self.state = SessionState::Connected;
                tracing::debug!(host = %self.endpoint.host, "SSH session established");
                true
            }
            Err(err) => {
                self.state = SessionState::Failed;
                tracing::error!(
                    host = %self.endpoint.host,
                    port = self.endpoint.port,
                    error = %err,
                    "SSH connection failed"
                );
                false
            }
        }
    }

    /// Closes the session. Safe to call in any state.
    pub fn disconnect(&mut self) {
        self.close_transport();
        self.state = SessionState::Disconnected;
    }

    fn close_transport(&mut self) {
        if let Err(err) = self.transport.close() {
            tracing::debug!(error = %err, "Ignoring error while closing SSH session");
        }
    }

    /// Runs `command` and returns its trimmed stdout.
    ///
    /// Connects first when the session is not connected. Output that is
    /// not valid UTF-8 is decoded lossily. A command that writes only to
    /// stderr is logged and yields an empty string rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] if the session could not be
    /// established, or the transport's error if execution failed.
    pub fn execute_command(&mut self, command: &str) -> SessionResult<String> {
        if !self.is_connected() && !self.connect() {
            return Err(SessionError::Connect {
                host: self.endpoint.host.clone(),
                port: self.endpoint.port,
            });
        }

        let output = self
            .transport
            .exec(command, self.timeouts.command)
            .inspect_err(|err| {
                tracing::error!(command, error = %err, "Command execution failed");
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if stdout.is_empty() && !stderr.is_empty() {
            tracing::warn!(command, stderr, "Command returned only error output");
        }

        Ok(stdout)
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Shared, serialised access point to a [`RemoteSession`]
///
/// Cloning the handle shares the same session. Every operation locks the
/// session for its whole duration on a blocking worker, so poll cycles and
/// control actions never interleave on the wire.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<RemoteSession>>,
    address: Arc<str>,
}

impl SessionHandle {
    /// Wraps `session` for shared use
    #[must_use]
    pub fn new(session: RemoteSession) -> Self {
        let address = session.endpoint().address().into();
        Self {
            session: Arc::new(Mutex::new(session)),
            address,
        }
    }

    /// `host:port` of the underlying endpoint
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Runs `op` with exclusive access to the session on a blocking worker
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Worker`] if the worker panicked or the
    /// runtime is shutting down.
    pub async fn with_session<F, R>(&self, op: F) -> SessionResult<R>
    where
        F: FnOnce(&mut RemoteSession) -> R + Send + 'static,
        R: Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut guard)
        })
        .await
        .map_err(|e| SessionError::Worker(e.to_string()))
    }

    /// Connects the session; `false` on failure
    pub async fn connect(&self) -> bool {
        self.with_session(RemoteSession::connect)
            .await
            .unwrap_or(false)
    }

    /// Closes the session, best-effort
    pub async fn disconnect(&self) {
        if let Err(err) = self.with_session(RemoteSession::disconnect).await {
            tracing::debug!(error = %err, "Session worker failed during disconnect");
        }
    }

    /// Runs one command over the shared session
    ///
    /// # Errors
    ///
    /// See [`RemoteSession::execute_command`].
    pub async fn execute_command(&self, command: impl Into<String>) -> SessionResult<String> {
        let command = command.into();
        self.with_session(move |session| session.execute_command(&command))
            .await?
    }

    /// Current state, or `None` while an operation holds the session
    #[must_use]
    pub fn try_state(&self) -> Option<SessionState> {
        self.session.try_lock().ok().map(|s| s.state())
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
