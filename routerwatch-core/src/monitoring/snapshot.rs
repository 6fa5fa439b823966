//! Assembles a [`SystemSnapshot`] from the five status commands

use crate::error::{SessionError, SessionResult};
use crate::session::RemoteSession;

use super::metrics::SystemSnapshot;
use super::parser::{
    ARP_COMMAND, LOADAVG_COMMAND, MEMORY_COMMAND, MetricsParser, MonitoringResult,
    NET_DEV_COMMAND, UPTIME_COMMAND,
};

/// Runs the status commands over one session and merges their output
///
/// Failures are isolated per field: a command that fails to execute or
/// whose output does not parse leaves that field at its default and the
/// remaining commands still run.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Builds a snapshot using `session`, connecting it if necessary.
    ///
    /// The session is left connected; closing it is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] only when the session cannot be
    /// established. Per-command failures never surface here.
    pub fn build(session: &mut RemoteSession) -> SessionResult<SystemSnapshot> {
        if !session.is_connected() && !session.connect() {
            let endpoint = session.endpoint();
            return Err(SessionError::Connect {
                host: endpoint.host.clone(),
                port: endpoint.port,
            });
        }

        let load = field_or_default(session, LOADAVG_COMMAND, MetricsParser::parse_loadavg)
            .unwrap_or_default();
        let memory = field_or_default(session, MEMORY_COMMAND, MetricsParser::parse_memory)
            .unwrap_or_default();
        let uptime = field_or_default(session, UPTIME_COMMAND, MetricsParser::parse_uptime);
        let interfaces =
            field_or_default(session, NET_DEV_COMMAND, MetricsParser::parse_interfaces)
                .unwrap_or_default();
        let devices = field_or_default(session, ARP_COMMAND, |output| {
            Ok(MetricsParser::parse_arp_table(output))
        })
        .unwrap_or_default();

        let snapshot = SystemSnapshot::from_parts(load, memory, uptime, interfaces, devices);
        tracing::debug!(
            host = %session.endpoint().host,
            interfaces = snapshot.interfaces.len(),
            devices = snapshot.connected_devices_count,
            "Snapshot built"
        );
        Ok(snapshot)
    }
}

/// Runs `command` and parses its output, logging and discarding any
/// failure.
fn field_or_default<T>(
    session: &mut RemoteSession,
    command: &'static str,
    parse: impl FnOnce(&str) -> MonitoringResult<T>,
) -> Option<T> {
    let output = match session.execute_command(command) {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!(command, error = %err, "Status command failed, using default");
            return None;
        }
    };

    match parse(&output) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(command, error = %err, "Unparseable status output, using default");
            None
        }
    }
}
