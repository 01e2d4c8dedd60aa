//! Dispatch loop — drains the notification queue and delivers to Telegram.
//!
//! Each popped identifier is handled to completion before the next pop:
//! 1. Resolve it against the store (unknown identifiers are dropped without a log)
//! 2. Render the message for the record's wallet
//! 3. Deliver it if the record has a chat to deliver to
//! 4. On throttling, wait the requested delay and push the identifier back
//! 5. Write exactly one log entry for the attempt
//!
//! Delivery failures never stop the loop. Queue and store failures do: they
//! are returned to the caller as [`AppError`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use tg_notify_common::error::AppError;
use tg_notify_common::types::NewTelegramLog;

use crate::queue::NotificationQueue;
use crate::store::NotificationStore;
use crate::telegram::{Messenger, SendError};
use crate::template::render_message;

/// How long [`Dispatcher::run`] keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One iteration: at most one pop, then return.
    SinglePass,
    /// Poll until the shutdown token is cancelled.
    Continuous,
}

/// Terminal state of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The queue had nothing to pop.
    Empty,
    /// The identifier did not resolve to a record. Nothing was logged.
    Skipped,
    /// Telegram accepted the message.
    Delivered,
    /// The record has no chat to deliver to.
    NotDeliverable,
    /// Telegram throttled us; the identifier went back on the queue.
    Requeued { retry_after: Duration },
    /// Telegram rejected the message for good.
    Failed,
}

impl DispatchOutcome {
    fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// Counters accumulated over one call to [`Dispatcher::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub popped: u64,
    pub skipped: u64,
    pub delivered: u64,
    pub not_deliverable: u64,
    pub requeued: u64,
    pub failed: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        if outcome != DispatchOutcome::Empty {
            self.popped += 1;
        }
        match outcome {
            DispatchOutcome::Empty => {}
            DispatchOutcome::Skipped => self.skipped += 1,
            DispatchOutcome::Delivered => self.delivered += 1,
            DispatchOutcome::NotDeliverable => self.not_deliverable += 1,
            DispatchOutcome::Requeued { .. } => self.requeued += 1,
            DispatchOutcome::Failed => self.failed += 1,
        }
    }
}

/// Sequential consumer of the notification queue.
pub struct Dispatcher<Q, S, M> {
    queue: Q,
    store: S,
    messenger: M,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl<Q, S, M> Dispatcher<Q, S, M>
where
    Q: NotificationQueue,
    S: NotificationStore,
    M: Messenger,
{
    pub fn new(queue: Q, store: S, messenger: M, poll_interval: Duration) -> Self {
        Self {
            queue,
            store,
            messenger,
            poll_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Use an externally owned shutdown token (e.g. one cancelled on Ctrl+C).
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Token that stops [`RunMode::Continuous`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the loop in the given mode.
    ///
    /// In `SinglePass` mode this returns after one iteration. In `Continuous`
    /// mode it returns only once the shutdown token is cancelled, or with the
    /// first infrastructure error.
    pub async fn run(&self, mode: RunMode) -> Result<DispatchStats, AppError> {
        let mut stats = DispatchStats::default();

        tracing::info!(
            mode = ?mode,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Notification dispatcher started"
        );

        loop {
            if self.shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping dispatcher");
                break;
            }

            let outcome = self.dispatch_next().await.inspect_err(|e| {
                tracing::error!(error = %e, "Dispatcher stopped on infrastructure error");
            })?;
            stats.record(outcome);

            if mode == RunMode::SinglePass {
                break;
            }

            // Stale identifiers cost nothing downstream; move straight on.
            if outcome == DispatchOutcome::Skipped {
                continue;
            }

            if !self.pause(self.poll_interval).await {
                tracing::info!("Shutdown requested, stopping dispatcher");
                break;
            }
        }

        tracing::info!(
            popped = stats.popped,
            delivered = stats.delivered,
            requeued = stats.requeued,
            failed = stats.failed,
            not_deliverable = stats.not_deliverable,
            skipped = stats.skipped,
            "Notification dispatcher stopped"
        );

        Ok(stats)
    }

    /// Pop one identifier and carry it to a terminal state.
    pub async fn dispatch_next(&self) -> Result<DispatchOutcome, AppError> {
        let Some(raw_id) = self.queue.pop().await? else {
            return Ok(DispatchOutcome::Empty);
        };

        let Ok(notification_id) = Uuid::parse_str(raw_id.trim()) else {
            tracing::warn!(value = %raw_id, "Dropping malformed notification id");
            return Ok(DispatchOutcome::Skipped);
        };

        let Some(notification) = self.store.get_notification(notification_id).await? else {
            tracing::debug!(notification_id = %notification_id, "No notification data, skipping");
            return Ok(DispatchOutcome::Skipped);
        };

        let text = render_message(&notification.wallet_id);

        let (outcome, requeue_result) = match notification.destination() {
            None => {
                tracing::info!(
                    notification_id = %notification_id,
                    "Notification has no Telegram chat, not sent"
                );
                (DispatchOutcome::NotDeliverable, Ok(()))
            }
            Some(chat_id) => match self.messenger.send_message(chat_id, &text).await {
                Ok(()) => {
                    tracing::info!(notification_id = %notification_id, "Notification delivered");
                    (DispatchOutcome::Delivered, Ok(()))
                }
                Err(SendError::Throttled { retry_after }) => {
                    tracing::warn!(
                        notification_id = %notification_id,
                        retry_after_secs = retry_after.as_secs(),
                        "Telegram rate limit hit, backing off before requeue"
                    );
                    // The identifier goes back even if shutdown cut the wait short.
                    self.pause(retry_after).await;
                    (
                        DispatchOutcome::Requeued { retry_after },
                        self.queue.push(&raw_id).await,
                    )
                }
                Err(e) => {
                    tracing::warn!(
                        notification_id = %notification_id,
                        error = %e,
                        "Notification delivery failed"
                    );
                    (DispatchOutcome::Failed, Ok(()))
                }
            },
        };

        // Log before surfacing a requeue failure so the attempt is never lost.
        self.store
            .write_log(&NewTelegramLog {
                notification_data_id: notification_id,
                message: text,
                is_successfully: outcome.is_success(),
            })
            .await?;
        requeue_result?;

        Ok(outcome)
    }

    /// Sleep for `duration`. Returns `false` if shutdown interrupted the sleep.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
