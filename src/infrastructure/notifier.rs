use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::ports::{BookingNotice, InvoiceSummary, Notifier, NotifierBox};
use crate::error::Result;

/// Logs every notice instead of sending it anywhere. The delivery channel of
/// the CLI, where the operator's terminal is the audience.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_booking_confirmation(&self, notice: &BookingNotice) -> Result<()> {
        tracing::info!(
            booking_id = %notice.booking_id,
            guest = %notice.guest_name,
            room = %notice.room_number,
            check_in = %notice.check_in,
            "booking confirmation"
        );
        Ok(())
    }

    async fn send_check_in_notice(&self, notice: &BookingNotice) -> Result<()> {
        tracing::info!(
            booking_id = %notice.booking_id,
            guest = %notice.guest_name,
            room = %notice.room_number,
            "check-in notice"
        );
        Ok(())
    }

    async fn send_check_out_notice(
        &self,
        notice: &BookingNotice,
        invoice: Option<&InvoiceSummary>,
    ) -> Result<()> {
        match invoice {
            Some(invoice) => tracing::info!(
                booking_id = %notice.booking_id,
                guest = %notice.guest_name,
                room = %notice.room_number,
                total = %invoice.total,
                paid = %invoice.paid,
                balance = %invoice.balance,
                "check-out notice"
            ),
            None => tracing::info!(
                booking_id = %notice.booking_id,
                guest = %notice.guest_name,
                room = %notice.room_number,
                "check-out notice"
            ),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentNotification {
    Confirmation(BookingNotice),
    CheckIn(BookingNotice),
    CheckOut(BookingNotice, Option<InvoiceSummary>),
}

/// Captures every notice in delivery order so tests can assert on what went
/// out after draining the outbox.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingNotifier {
    /// Returns the notifier boxed for the outbox, plus the shared record of
    /// what it delivered.
    pub fn boxed() -> (NotifierBox, Arc<Mutex<Vec<SentNotification>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let notifier = Box::new(Self { sent: sent.clone() });
        (notifier, sent)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_booking_confirmation(&self, notice: &BookingNotice) -> Result<()> {
        self.sent
            .lock()
            .await
            .push(SentNotification::Confirmation(notice.clone()));
        Ok(())
    }

    async fn send_check_in_notice(&self, notice: &BookingNotice) -> Result<()> {
        self.sent
            .lock()
            .await
            .push(SentNotification::CheckIn(notice.clone()));
        Ok(())
    }

    async fn send_check_out_notice(
        &self,
        notice: &BookingNotice,
        invoice: Option<&InvoiceSummary>,
    ) -> Result<()> {
        self.sent
            .lock()
            .await
            .push(SentNotification::CheckOut(notice.clone(), invoice.cloned()));
        Ok(())
    }
}
