//! Scripted transport and router output fixtures for tests.
//!
//! [`ScriptedTransport`] stands in for the SSH transport: commands are
//! answered from a table, connection failures and latency can be injected,
//! and every call is counted so tests can assert on connect/close
//! behaviour. Clones share state, so a test keeps one clone for assertions
//! and hands another to the session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{SessionError, SessionResult};
use crate::monitoring::{
    ARP_COMMAND, LOADAVG_COMMAND, MEMORY_COMMAND, NET_DEV_COMMAND, UPTIME_COMMAND,
};
use crate::session::{CommandOutput, RemoteEndpoint, RemoteTransport, SessionTimeouts};

/// `cat /proc/loadavg` on an idle router
pub const LOADAVG_OUTPUT: &str = "0.15 0.22 0.10 1/234 5678\n";

/// `free -m` from a 256 MB router (busybox layout)
pub const MEMORY_OUTPUT: &str = "\
              total        used        free      shared  buff/cache   available
Mem: 256 120 136 0 10 80
Swap:             0           0           0
";

/// `cat /proc/uptime`: 1 day, 1 hour, 1 minute, 1.5 seconds
pub const UPTIME_OUTPUT: &str = "90061.50 170000.12\n";

/// `cat /proc/net/dev` with loopback, one LAN and one WAN interface
pub const NET_DEV_OUTPUT: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1024 16 0 0 0 0 0 0 1024 16 0 0 0 0 0 0
  eth0: 987654321 812345 0 0 0 0 0 1200 123456789 654321 0 0 0 0 0 0
   br0: 55512 410 0 0 0 0 0 3 88123 390 0 0 0 0 0 0
";

/// `cat /proc/net/arp` with two live neighbours and one incomplete entry
pub const ARP_OUTPUT: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.0.10     0x1         0x2         a4:5e:60:c2:11:9f     *        br0
192.168.0.23     0x1         0x2         3c:22:fb:01:7a:e4     *        br0
192.168.0.99     0x1         0x0         00:00:00:00:00:00     *        br0
";

enum Scripted {
    Output(CommandOutput),
    Error,
}

#[derive(Default)]
struct ScriptState {
    responses: HashMap<String, Scripted>,
    connect_fails: bool,
    close_fails: bool,
    latency: Duration,
    connect_count: usize,
    close_count: usize,
    executed: Vec<String>,
}

/// In-memory [`RemoteTransport`] driven by a command table
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
    active_ops: Arc<AtomicUsize>,
    max_active_ops: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    /// Creates a transport with no scripted commands
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport answering all five status commands with the
    /// fixtures in this module
    #[must_use]
    pub fn router_fixture() -> Self {
        Self::new()
            .with_response(LOADAVG_COMMAND, LOADAVG_OUTPUT)
            .with_response(MEMORY_COMMAND, MEMORY_OUTPUT)
            .with_response(UPTIME_COMMAND, UPTIME_OUTPUT)
            .with_response(NET_DEV_COMMAND, NET_DEV_OUTPUT)
            .with_response(ARP_COMMAND, ARP_OUTPUT)
            .with_response(crate::control::REBOOT_COMMAND, "")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answers `command` with `stdout`
    #[must_use]
    pub fn with_response(self, command: &str, stdout: impl Into<String>) -> Self {
        self.set_response(command, stdout);
        self
    }

    /// Answers `command` with raw, possibly non-UTF-8, bytes
    #[must_use]
    pub fn with_raw_response(self, command: &str, stdout: Vec<u8>) -> Self {
        self.lock().responses.insert(
            command.to_string(),
            Scripted::Output(CommandOutput {
                stdout,
                stderr: Vec::new(),
            }),
        );
        self
    }

    /// Answers `command` with empty stdout and the given stderr
    #[must_use]
    pub fn with_stderr(self, command: &str, stderr: impl Into<String>) -> Self {
        self.lock().responses.insert(
            command.to_string(),
            Scripted::Output(CommandOutput {
                stdout: Vec::new(),
                stderr: stderr.into().into_bytes(),
            }),
        );
        self
    }

    /// Makes `command` fail with a transport error
    #[must_use]
    pub fn with_exec_error(self, command: &str) -> Self {
        self.lock()
            .responses
            .insert(command.to_string(), Scripted::Error);
        self
    }

    /// Replaces the answer for `command`
    pub fn set_response(&self, command: &str, stdout: impl Into<String>) {
        self.lock().responses.insert(
            command.to_string(),
            Scripted::Output(CommandOutput::stdout(stdout.into())),
        );
    }

    /// Makes subsequent connection attempts fail (or succeed again)
    pub fn set_connect_fails(&self, fails: bool) {
        self.lock().connect_fails = fails;
    }

    /// Makes `close` report an error
    pub fn set_close_fails(&self, fails: bool) {
        self.lock().close_fails = fails;
    }

    /// Delay applied to every open and exec call
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Number of `open` calls so far
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.lock().connect_count
    }

    /// Number of `close` calls so far
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// Commands executed so far, in order
    #[must_use]
    pub fn executed_commands(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Highest number of transport calls observed running at once
    #[must_use]
    pub fn max_concurrent_ops(&self) -> usize {
        self.max_active_ops.load(Ordering::SeqCst)
    }

    fn enter(&self) -> ActiveOp<'_> {
        let now = self.active_ops.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_ops.fetch_max(now, Ordering::SeqCst);
        ActiveOp(&self.active_ops)
    }

    fn simulate_latency(&self) {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
    }
}

struct ActiveOp<'a>(&'a AtomicUsize);

impl Drop for ActiveOp<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteTransport for ScriptedTransport {
    fn open(&mut self, endpoint: &RemoteEndpoint, _timeouts: &SessionTimeouts) -> SessionResult<()> {
        let _op = self.enter();
        self.simulate_latency();

        let mut state = self.lock();
        state.connect_count += 1;
        if state.connect_fails {
            return Err(SessionError::Transport(format!(
                "connection refused by {}",
                endpoint.address()
            )));
        }
        Ok(())
    }

    fn exec(&mut self, command: &str, _timeout: Duration) -> SessionResult<CommandOutput> {
        let _op = self.enter();
        self.simulate_latency();

        let mut state = self.lock();
        state.executed.push(command.to_string());
        match state.responses.get(command) {
            Some(Scripted::Output(output)) => Ok(output.clone()),
            Some(Scripted::Error) => Err(SessionError::Execution {
                command: command.to_string(),
                reason: "channel closed".to_string(),
            }),
            None => Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: format!("sh: {command}: not found").into_bytes(),
            }),
        }
    }

    fn close(&mut self) -> SessionResult<()> {
        let mut state = self.lock();
        state.close_count += 1;
        if state.close_fails {
            return Err(SessionError::Transport("socket already closed".to_string()));
        }
        Ok(())
    }
}
