//! Status poller — the fetch → validate → parse → notify loop.
//!
//! One cycle runs at a time. Between cycles the poller sleeps for a fixed
//! interval regardless of outcome; that sleep is the only retry mechanism
//! and can be interrupted by a `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channels::{Notifier, deliver};
use crate::error::PollError;
use crate::practicum::{StatusApi, cursor_of, validate};
use crate::status::parse_status;

/// Last messages actually delivered, used to suppress consecutive repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub last_status_message: Option<String>,
    pub last_error_message: Option<String>,
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A status message differing from the last one was produced.
    StatusChanged { message: String, delivered: bool },
    /// Nothing new to report: empty window or same status as before.
    Unchanged,
    /// The cycle failed; `reported` is false when the error was a repeat
    /// or its notification could not be delivered.
    Failed { error: PollError, reported: bool },
}

/// Polls the status API and reports changes through a notifier.
pub struct StatusPoller {
    api: Arc<dyn StatusApi>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    cursor: i64,
    state: NotificationState,
}

impl StatusPoller {
    pub fn new(
        api: Arc<dyn StatusApi>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        cursor: i64,
    ) -> Self {
        Self {
            api,
            notifier,
            interval,
            cursor,
            state: NotificationState::default(),
        }
    }

    /// Start of the time window requested on the next cycle.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Run exactly one poll cycle. Never fails; errors are reported and
    /// returned as an outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        debug!(cursor = self.cursor, "Starting poll cycle");

        match self.poll().await {
            Ok((message, next_cursor)) => {
                let outcome = match message {
                    Some(message)
                        if self.state.last_status_message.as_deref() != Some(message.as_str()) =>
                    {
                        let delivered = deliver(self.notifier.as_ref(), &message).await;
                        if delivered {
                            self.state.last_status_message = Some(message.clone());
                        }
                        CycleOutcome::StatusChanged { message, delivered }
                    }
                    _ => {
                        debug!("Homework status unchanged");
                        CycleOutcome::Unchanged
                    }
                };

                if let Some(next) = next_cursor {
                    self.cursor = next;
                }
                outcome
            }
            Err(error) => {
                let text = format!("Сбой в работе программы: {error}");
                if error.is_transient() {
                    warn!("{text}");
                } else {
                    error!("{text}");
                }

                let reported = if self.state.last_error_message.as_deref() == Some(text.as_str()) {
                    debug!("Same error already reported");
                    false
                } else {
                    let delivered = deliver(self.notifier.as_ref(), &text).await;
                    if delivered {
                        self.state.last_error_message = Some(text);
                    }
                    delivered
                };

                CycleOutcome::Failed { error, reported }
            }
        }
    }

    async fn poll(&self) -> Result<(Option<String>, Option<i64>), PollError> {
        let payload = self.api.fetch(self.cursor).await?;
        let records = validate(&payload)?;
        let message = parse_status(&records)?;
        Ok((message, cursor_of(&payload)))
    }

    /// Poll forever, sleeping `interval` between cycles, until `shutdown`
    /// is cancelled. A cycle in progress is always allowed to finish.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            cursor = self.cursor,
            "Status poller started"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Status poller shutting down");
    }
}

/// Register for Ctrl-C and, on unix, SIGTERM.
///
/// Registration happens before this returns, so a signal delivered between
/// the call and the first poll of the future is not lost.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Ctrl-C handler unavailable: {e}");
                    terminate.recv().await;
                }
            }
            _ = terminate.recv() => {}
        }

        #[cfg(not(unix))]
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    })
}

/// Spawn the poller on its own task. Cancel `shutdown` to stop it.
pub fn spawn_status_poller(poller: StatusPoller, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(poller.run(shutdown))
}
