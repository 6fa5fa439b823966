//! SSH transport built on `ssh2` (libssh2)
//!
//! Password authentication only: no key files and no agent are consulted.
//! Unknown host keys are accepted and appended to a known_hosts file so
//! that later connections are checked against them; a changed key is
//! rejected.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::ExposeSecret;
use ssh2::{CheckResult, KnownHostFileKind, Session};

use crate::error::{SessionError, SessionResult};

use super::transport::{CommandOutput, RemoteTransport, SessionTimeouts};
use super::RemoteEndpoint;

/// libssh2-backed [`RemoteTransport`]
pub struct Ssh2Transport {
    session: Option<Session>,
    known_hosts_path: Option<PathBuf>,
}

impl Ssh2Transport {
    /// Creates a transport that persists host keys to `known_hosts_path`
    ///
    /// With `None`, unknown host keys are accepted for the lifetime of the
    /// connection only.
    #[must_use]
    pub fn new(known_hosts_path: Option<PathBuf>) -> Self {
        Self {
            session: None,
            known_hosts_path,
        }
    }

    fn session(&self, command: &str) -> SessionResult<&Session> {
        self.session.as_ref().ok_or_else(|| SessionError::Execution {
            command: command.to_string(),
            reason: "session is not open".to_string(),
        })
    }

    /// Checks the server host key against the known_hosts file, adding it
    /// when the host has not been seen before.
    fn verify_host_key(&self, session: &Session, endpoint: &RemoteEndpoint) -> SessionResult<()> {
        let Some(path) = self.known_hosts_path.as_deref() else {
            return Ok(());
        };

        let mut known_hosts = session.known_hosts()?;
        if path.exists() {
            known_hosts.read_file(path, KnownHostFileKind::OpenSSH)?;
        }

        let (key, key_type) = session
            .host_key()
            .ok_or_else(|| SessionError::Transport("server sent no host key".to_string()))?;

        match known_hosts.check_port(&endpoint.host, endpoint.port, key) {
            CheckResult::Match => Ok(()),
            CheckResult::NotFound => {
                let entry = known_hosts_entry(&endpoint.host, endpoint.port);
                known_hosts.add(&entry, key, "added by routerwatch", key_type.into())?;
                if let Err(err) = persist_known_hosts(&known_hosts, path) {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Could not persist new host key"
                    );
                } else {
                    tracing::info!(host = %endpoint.host, "Added new host key to known_hosts");
                }
                Ok(())
            }
            CheckResult::Mismatch => Err(SessionError::HostKeyMismatch {
                host: endpoint.host.clone(),
            }),
            CheckResult::Failure => Err(SessionError::Transport(
                "known_hosts check failed".to_string(),
            )),
        }
    }
}

/// Formats a host for known_hosts, using the bracketed form for
/// non-standard ports as OpenSSH does.
fn known_hosts_entry(host: &str, port: u16) -> String {
    if port == 22 {
        host.to_string()
    } else {
        format!("[{host}]:{port}")
    }
}

fn persist_known_hosts(known_hosts: &ssh2::KnownHosts, path: &Path) -> SessionResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    known_hosts.write_file(path, KnownHostFileKind::OpenSSH)?;
    Ok(())
}

fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

impl RemoteTransport for Ssh2Transport {
    fn open(&mut self, endpoint: &RemoteEndpoint, timeouts: &SessionTimeouts) -> SessionResult<()> {
        // Drop any half-open session left from a previous attempt.
        self.session = None;

        let addr = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                SessionError::Transport(format!("could not resolve {}", endpoint.host))
            })?;

        let tcp = TcpStream::connect_timeout(&addr, timeouts.connect)?;
        tcp.set_read_timeout(Some(timeouts.connect))?;
        tcp.set_write_timeout(Some(timeouts.connect))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_millis(timeouts.connect));
        session.handshake()?;

        self.verify_host_key(&session, endpoint)?;

        session
            .userauth_password(&endpoint.username, endpoint.password.expose_secret())
            .map_err(|_| SessionError::Authentication {
                host: endpoint.host.clone(),
                username: endpoint.username.clone(),
            })?;
        if !session.authenticated() {
            return Err(SessionError::Authentication {
                host: endpoint.host.clone(),
                username: endpoint.username.clone(),
            });
        }

        self.session = Some(session);
        Ok(())
    }

    fn exec(&mut self, command: &str, timeout: Duration) -> SessionResult<CommandOutput> {
        let session = self.session(command)?;
        session.set_timeout(timeout_millis(timeout));

        let execution_error = |e: &dyn std::fmt::Display| SessionError::Execution {
            command: command.to_string(),
            reason: e.to_string(),
        };

        let mut channel = session
            .channel_session()
            .map_err(|e| execution_error(&e))?;
        channel.exec(command).map_err(|e| execution_error(&e))?;

        let mut stdout = Vec::new();
        channel
            .read_to_end(&mut stdout)
            .map_err(|e| execution_error(&e))?;

        let mut stderr = Vec::new();
        channel
            .stderr()
            .read_to_end(&mut stderr)
            .map_err(|e| execution_error(&e))?;

        // Output is complete; close errors are ignored.
        channel.wait_close().ok();

        Ok(CommandOutput { stdout, stderr })
    }

    fn close(&mut self) -> SessionResult<()> {
        if let Some(session) = self.session.take() {
            session.disconnect(None, "routerwatch closing session", None)?;
        }
        Ok(())
    }
}
