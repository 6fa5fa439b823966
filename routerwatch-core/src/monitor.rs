//! Lifecycle of a monitored router
//!
//! [`RouterMonitor`] is what a host application holds: it owns the shared
//! session, the poll scheduler, and its timer, and exposes the cached
//! results and the reboot action.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tracing::Instrument;

use crate::config::{ConfigManager, RouterSettings};
use crate::control;
use crate::error::{RouterWatchError, RouterWatchResult};
use crate::monitoring::{PollResult, PollScheduler, PollState, SchedulerHandle, SystemSnapshot};
use crate::session::{RemoteEndpoint, RemoteSession, RemoteTransport, SessionHandle, SessionTimeouts};
use crate::trace_operation;
use crate::tracing::span_names;

/// Everything needed to start monitoring one router
#[derive(Debug, Clone)]
pub struct MonitorParams {
    /// Router address and credentials
    pub endpoint: RemoteEndpoint,
    /// Session timeouts
    pub timeouts: SessionTimeouts,
    /// Time between poll cycles
    pub interval: Duration,
    /// Where accepted host keys are stored
    pub known_hosts_path: Option<PathBuf>,
}

impl MonitorParams {
    /// Derives parameters from loaded settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid or carry
    /// no password.
    pub fn from_settings(
        settings: &RouterSettings,
        config: &ConfigManager,
    ) -> RouterWatchResult<Self> {
        Ok(Self {
            endpoint: settings.endpoint()?,
            timeouts: settings.ssh.timeouts(),
            interval: settings.polling.interval(),
            known_hosts_path: Some(config.known_hosts_path(settings)),
        })
    }

    /// Opens a disconnected SSH session handle for these parameters
    #[must_use]
    pub fn ssh_session(&self) -> SessionHandle {
        SessionHandle::new(RemoteSession::ssh(
            self.endpoint.clone(),
            self.timeouts,
            self.known_hosts_path.clone(),
        ))
    }

    fn session_with(&self, transport: Box<dyn RemoteTransport>) -> SessionHandle {
        SessionHandle::new(RemoteSession::new(
            self.endpoint.clone(),
            self.timeouts,
            transport,
        ))
    }
}

/// Checks that the router accepts a login, then closes the session.
pub async fn test_connection(session: &SessionHandle) -> bool {
    let span = trace_operation!(span_names::SESSION_TEST, host = %session.address());

    async {
        let connected = session.connect().await;
        session.disconnect().await;
        if connected {
            tracing::info!("Connection test succeeded");
        } else {
            tracing::warn!("Connection test failed");
        }
        connected
    }
    .instrument(span)
    .await
}

/// A router being polled on a schedule
#[derive(Debug)]
pub struct RouterMonitor {
    scheduler: PollScheduler,
    timer: SchedulerHandle,
}

impl RouterMonitor {
    /// Connects over SSH, runs the first refresh, and starts the timer.
    ///
    /// # Errors
    ///
    /// Returns [`RouterWatchError::FirstRefresh`] if the first refresh
    /// fails; no timer is left running in that case.
    pub async fn setup(params: &MonitorParams) -> RouterWatchResult<Self> {
        Self::start(params, params.ssh_session()).await
    }

    /// As [`setup`](Self::setup), over a caller-supplied transport
    ///
    /// # Errors
    ///
    /// See [`setup`](Self::setup).
    pub async fn setup_with_transport(
        params: &MonitorParams,
        transport: Box<dyn RemoteTransport>,
    ) -> RouterWatchResult<Self> {
        Self::start(params, params.session_with(transport)).await
    }

    async fn start(params: &MonitorParams, session: SessionHandle) -> RouterWatchResult<Self> {
        let span = trace_operation!(
            span_names::MONITOR_SETUP,
            host = %session.address(),
            interval_secs = params.interval.as_secs()
        );

        async {
            let scheduler = PollScheduler::new(session, params.interval);

            if let PollResult::Failure { reason, .. } = scheduler.refresh().await {
                scheduler.session().disconnect().await;
                tracing::error!(reason = %reason, "First refresh failed, monitor not started");
                return Err(RouterWatchError::FirstRefresh(reason));
            }

            let timer = scheduler.start();
            tracing::info!("Router monitor started");
            Ok(Self { scheduler, timer })
        }
        .instrument(span)
        .await
    }

    /// The scheduler behind this monitor
    #[must_use]
    pub const fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Latest cycle outcome
    #[must_use]
    pub fn last_result(&self) -> Option<PollResult> {
        self.scheduler.last_result()
    }

    /// Latest successful snapshot
    #[must_use]
    pub fn last_snapshot(&self) -> Option<SystemSnapshot> {
        self.scheduler.last_snapshot()
    }

    /// Whether the router answered the latest cycle
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.scheduler.last_update_success()
    }

    /// Whether a cycle is running
    #[must_use]
    pub fn state(&self) -> PollState {
        self.scheduler.state()
    }

    /// Requests a refresh now, joining any cycle already running
    pub async fn refresh(&self) -> PollResult {
        self.scheduler.refresh().await
    }

    /// Receiver notified after every completed cycle
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<PollResult>> {
        self.scheduler.subscribe()
    }

    /// Reboots the router over the shared session
    pub async fn reboot(&self) -> bool {
        control::reboot(self.scheduler.session()).await
    }

    /// Stops the timer and closes the session
    pub async fn shutdown(self) {
        self.timer.stop().await;
        self.scheduler.session().disconnect().await;
        tracing::info!(host = %self.scheduler.session().address(), "Router monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollFailure;
    use crate::testing::ScriptedTransport;

    fn params() -> MonitorParams {
        MonitorParams {
            endpoint: RemoteEndpoint::new("192.168.1.1", "admin", "secret".to_string()),
            timeouts: SessionTimeouts::default(),
            interval: Duration::from_secs(30),
            known_hosts_path: None,
        }
    }

    #[tokio::test]
    async fn test_setup_runs_first_refresh() {
        let transport = ScriptedTransport::router_fixture();
        let monitor = RouterMonitor::setup_with_transport(&params(), Box::new(transport.clone()))
            .await
            .unwrap();

        assert!(monitor.last_update_success());
        assert_eq!(monitor.last_snapshot().unwrap().memory_total_mb, 256);
        assert_eq!(transport.connect_count(), 1);

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_setup_fails_when_first_refresh_fails() {
        let transport = ScriptedTransport::router_fixture();
        transport.set_connect_fails(true);

        let err = RouterMonitor::setup_with_transport(&params(), Box::new(transport))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterWatchError::FirstRefresh(PollFailure::Connect(addr)) if addr == "192.168.1.1:22"
        ));
    }

    #[tokio::test]
    async fn test_reboot_through_monitor() {
        let transport = ScriptedTransport::router_fixture();
        let monitor = RouterMonitor::setup_with_transport(&params(), Box::new(transport.clone()))
            .await
            .unwrap();

        assert!(monitor.reboot().await);
        assert_eq!(
            transport.executed_commands().last().map(String::as_str),
            Some(control::REBOOT_COMMAND)
        );
        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_connection_test_connects_and_closes() {
        let transport = ScriptedTransport::new();
        let session = params().session_with(Box::new(transport.clone()));

        assert!(test_connection(&session).await);
        assert_eq!(transport.connect_count(), 1);
        assert!(transport.close_count() >= 1);

        transport.set_connect_fails(true);
        assert!(!test_connection(&session).await);
    }

    #[test]
    fn test_params_from_settings() {
        let mut settings = RouterSettings::default();
        settings.router.password = Some("pw".to_string().into());
        settings.polling.interval_secs = 1;
        let config = ConfigManager::with_config_dir(PathBuf::from("/tmp/rw"));

        let params = MonitorParams::from_settings(&settings, &config).unwrap();
        assert_eq!(params.interval, Duration::from_secs(5));
        assert_eq!(
            params.known_hosts_path,
            Some(PathBuf::from("/tmp/rw/known_hosts"))
        );
    }
}
