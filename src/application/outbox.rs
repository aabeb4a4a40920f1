//! Asynchronous notification outbox.
//!
//! Lifecycle operations enqueue jobs and move on; a single worker task owns
//! the notifier and delivers in order. Delivery failures retry a bounded
//! number of times and are then dropped with a warning. A lost notification
//! must never fail or roll back the booking operation that produced it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::ports::{BookingNotice, InvoiceSummary, Notifier, NotifierBox};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub enum NotificationJob {
    BookingConfirmation(BookingNotice),
    CheckInNotice(BookingNotice),
    CheckOutNotice {
        notice: BookingNotice,
        invoice: Option<InvoiceSummary>,
    },
}

impl NotificationJob {
    fn booking_id(&self) -> &str {
        match self {
            Self::BookingConfirmation(n) | Self::CheckInNotice(n) => &n.booking_id,
            Self::CheckOutNotice { notice, .. } => &notice.booking_id,
        }
    }
}

/// Handle to the delivery worker. Dropping the handle without `close` leaves
/// queued jobs undelivered; `close` drains the queue first.
pub struct NotificationOutbox {
    tx: mpsc::UnboundedSender<NotificationJob>,
    worker: JoinHandle<()>,
}

impl NotificationOutbox {
    pub fn spawn(notifier: NotifierBox) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver_loop(rx, notifier));
        Self { tx, worker }
    }

    /// Queues a job without waiting for delivery.
    pub fn enqueue(&self, job: NotificationJob) {
        if let Err(e) = self.tx.send(job) {
            tracing::warn!(booking_id = %e.0.booking_id(), "outbox closed; notification dropped");
        }
    }

    /// Closes the queue and waits for the worker to drain it.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::warn!(error = %e, "notification worker did not shut down cleanly");
        }
    }
}

async fn deliver_loop(mut rx: mpsc::UnboundedReceiver<NotificationJob>, notifier: NotifierBox) {
    while let Some(job) = rx.recv().await {
        deliver(notifier.as_ref(), job).await;
    }
}

async fn deliver(notifier: &dyn Notifier, job: NotificationJob) {
    for attempt in 1..=MAX_ATTEMPTS {
        let result = match &job {
            NotificationJob::BookingConfirmation(notice) => {
                notifier.send_booking_confirmation(notice).await
            }
            NotificationJob::CheckInNotice(notice) => notifier.send_check_in_notice(notice).await,
            NotificationJob::CheckOutNotice { notice, invoice } => {
                notifier.send_check_out_notice(notice, invoice.as_ref()).await
            }
        };
        match result {
            Ok(()) => return,
            Err(e) if attempt < MAX_ATTEMPTS => {
                tracing::debug!(
                    booking_id = %job.booking_id(),
                    attempt,
                    error = %e,
                    "notification delivery failed; retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => {
                tracing::warn!(
                    booking_id = %job.booking_id(),
                    attempts = MAX_ATTEMPTS,
                    error = %e,
                    "notification dropped after repeated failures"
                );
            }
        }
    }
}
