//! Periodic polling with coalesced refreshes
//!
//! A [`PollScheduler`] runs at most one poll cycle at a time. A refresh
//! requested while a cycle is running joins that cycle and receives the
//! same [`PollResult`]. Results are cached and published on a watch
//! channel; a failed cycle never replaces the last good snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::error::{PollFailure, SessionError};
use crate::session::SessionHandle;
use crate::trace_operation;
use crate::tracing::span_names;

use super::metrics::SystemSnapshot;
use super::snapshot::SnapshotBuilder;

/// Default time between poll cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Whether a poll cycle is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    /// Waiting for the next tick or refresh request
    #[default]
    Idle,
    /// A cycle is in flight
    Refreshing,
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollResult {
    /// The router was reached and a snapshot built
    Success {
        /// Metrics captured by the cycle
        snapshot: SystemSnapshot,
        /// When the cycle finished
        timestamp: DateTime<Utc>,
    },
    /// The cycle could not produce a snapshot
    Failure {
        /// Why the cycle failed
        reason: PollFailure,
        /// When the cycle finished
        timestamp: DateTime<Utc>,
    },
}

impl PollResult {
    /// A success stamped with the current time
    #[must_use]
    pub fn success(snapshot: SystemSnapshot) -> Self {
        Self::Success {
            snapshot,
            timestamp: Utc::now(),
        }
    }

    /// A failure stamped with the current time
    #[must_use]
    pub fn failure(reason: PollFailure) -> Self {
        Self::Failure {
            reason,
            timestamp: Utc::now(),
        }
    }

    /// Whether the cycle succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The snapshot, for successful cycles
    #[must_use]
    pub const fn snapshot(&self) -> Option<&SystemSnapshot> {
        match self {
            Self::Success { snapshot, .. } => Some(snapshot),
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason, for failed cycles
    #[must_use]
    pub const fn failure_reason(&self) -> Option<&PollFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    /// When the cycle finished
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Success { timestamp, .. } | Self::Failure { timestamp, .. } => *timestamp,
        }
    }
}

type SharedCycle = Shared<BoxFuture<'static, PollResult>>;

#[derive(Default)]
struct CycleState {
    in_flight: Option<SharedCycle>,
    last_result: Option<PollResult>,
    last_snapshot: Option<SystemSnapshot>,
    last_update_success: bool,
}

struct SchedulerInner {
    session: SessionHandle,
    interval: Duration,
    state: Mutex<CycleState>,
    publisher: watch::Sender<Option<PollResult>>,
}

impl SchedulerInner {
    fn lock_state(&self) -> MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect, build, always disconnect.
    async fn run_cycle(&self) -> PollResult {
        let span = trace_operation!(span_names::POLL_CYCLE, host = %self.session.address());

        async {
            let outcome = self
                .session
                .with_session(|session| {
                    if !session.connect() {
                        session.disconnect();
                        let endpoint = session.endpoint();
                        return Err(SessionError::Connect {
                            host: endpoint.host.clone(),
                            port: endpoint.port,
                        });
                    }
                    let snapshot = SnapshotBuilder::build(session);
                    session.disconnect();
                    snapshot
                })
                .await;

            match outcome {
                Ok(Ok(snapshot)) => {
                    tracing::debug!("Poll cycle succeeded");
                    PollResult::success(snapshot)
                }
                Ok(Err(err)) | Err(err) => {
                    tracing::warn!(error = %err, "Poll cycle failed");
                    PollResult::failure(PollFailure::from(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Records the outcome of the in-flight cycle and publishes it.
    fn complete(&self, result: &PollResult) {
        {
            let mut state = self.lock_state();
            if let PollResult::Success { snapshot, .. } = result {
                state.last_snapshot = Some(snapshot.clone());
            }
            state.last_update_success = result.is_success();
            state.last_result = Some(result.clone());
            state.in_flight = None;
        }
        self.publisher.send_replace(Some(result.clone()));
    }
}

/// Drives poll cycles over a shared session
///
/// Cloning the scheduler shares its state; all clones coalesce onto the
/// same in-flight cycle.
#[derive(Clone)]
pub struct PollScheduler {
    inner: Arc<SchedulerInner>,
}

impl PollScheduler {
    /// Creates an idle scheduler polling every `interval`
    #[must_use]
    pub fn new(session: SessionHandle, interval: Duration) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            inner: Arc::new(SchedulerInner {
                session,
                interval,
                state: Mutex::new(CycleState::default()),
                publisher,
            }),
        }
    }

    /// The session shared by poll cycles
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Time between timer-driven cycles
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Runs a poll cycle, or joins the one already running.
    ///
    /// Every caller attached to the same cycle receives an identical
    /// result. Dropping the returned future does not cancel the cycle.
    pub async fn refresh(&self) -> PollResult {
        let cycle = {
            let mut state = self.inner.lock_state();
            if let Some(cycle) = &state.in_flight {
                tracing::debug!("Joining in-flight poll cycle");
                cycle.clone()
            } else {
                let cycle = self.spawn_cycle();
                state.in_flight = Some(cycle.clone());
                cycle
            }
        };
        cycle.await
    }

    /// Must be called with the state lock held so the cycle cannot
    /// complete before it is registered as in flight.
    fn spawn_cycle(&self) -> SharedCycle {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = inner.run_cycle().await;
            inner.complete(&result);
            result
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!(error = %err, "Poll cycle task aborted");
                    let result = PollResult::failure(PollFailure::Unexpected(err.to_string()));
                    inner.complete(&result);
                    result
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Starts the periodic timer.
    ///
    /// The first tick fires one interval from now. Ticks that would fire
    /// while a cycle is still running are delayed, never stacked. Dropping
    /// the returned handle also stops the timer.
    #[must_use = "the timer stops when the handle is dropped"]
    pub fn start(&self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let scheduler = self.clone();
        let period = self.inner.interval;
        let span = trace_operation!(
            span_names::POLL_TIMER,
            host = %self.inner.session.address(),
            interval_secs = period.as_secs()
        );

        let task = tokio::spawn(
            async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = stop_rx.recv() => break,
                        _ = ticker.tick() => {
                            tokio::select! {
                                _ = stop_rx.recv() => break,
                                _ = scheduler.refresh() => {}
                            }
                        }
                    }
                }
                tracing::debug!("Poll timer stopped");
            }
            .instrument(span),
        );

        SchedulerHandle { stop_tx, task }
    }

    /// Current scheduler state
    #[must_use]
    pub fn state(&self) -> PollState {
        if self.inner.lock_state().in_flight.is_some() {
            PollState::Refreshing
        } else {
            PollState::Idle
        }
    }

    /// Latest cycle outcome, success or failure
    #[must_use]
    pub fn last_result(&self) -> Option<PollResult> {
        self.inner.lock_state().last_result.clone()
    }

    /// Latest successfully captured snapshot
    #[must_use]
    pub fn last_snapshot(&self) -> Option<SystemSnapshot> {
        self.inner.lock_state().last_snapshot.clone()
    }

    /// Whether the latest cycle succeeded
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.inner.lock_state().last_update_success
    }

    /// Receiver notified after every completed cycle
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<PollResult>> {
        self.inner.publisher.subscribe()
    }
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("session", &self.inner.session)
            .field("interval", &self.inner.interval)
            .field("state", &self.state())
            .finish()
    }
}

/// Handle to a running poll timer
#[derive(Debug)]
pub struct SchedulerHandle {
    stop_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the timer and waits for its task to finish.
    ///
    /// A cycle already in flight keeps running and still records its
    /// result.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
        if let Err(err) = self.task.await {
            tracing::debug!(error = %err, "Poll timer task ended abnormally");
        }
    }

    /// Whether the timer task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
