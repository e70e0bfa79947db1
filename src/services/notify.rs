use std::sync::Arc;

use crate::models::{Booking, ServiceLookup};
use crate::services::messaging::{MessagingProvider, OutgoingMessage};

pub const EDIT_CALLBACK_PREFIX: &str = "edit_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Relays messages to every configured administrator chat.
pub struct AdminNotifier {
    messaging: Arc<dyn MessagingProvider>,
    admin_ids: Vec<String>,
}

impl AdminNotifier {
    pub fn new(messaging: Arc<dyn MessagingProvider>, admin_ids: Vec<String>) -> Self {
        Self {
            messaging,
            admin_ids,
        }
    }

    pub fn admin_ids(&self) -> &[String] {
        &self.admin_ids
    }

    /// Sends to each admin independently; a failed delivery is logged and
    /// counted, and never stops the remaining sends.
    pub async fn broadcast(&self, message: &OutgoingMessage) -> NotifyReport {
        let mut report = NotifyReport::default();

        if self.admin_ids.is_empty() {
            tracing::warn!("no admin ids configured, notification dropped");
            return report;
        }

        for admin_id in &self.admin_ids {
            match self.messaging.send_message(admin_id, message).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::error!(admin_id = %admin_id, error = %e, "failed to notify admin");
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub async fn notify_new_booking(
        &self,
        booking: &Booking,
        service: ServiceLookup<'_>,
    ) -> NotifyReport {
        let message = OutgoingMessage::text(format_new_booking(booking, service))
            .with_button("✏️ Edit", format!("{EDIT_CALLBACK_PREFIX}{}", booking.id));
        let report = self.broadcast(&message).await;
        tracing::info!(
            booking_id = %booking.id,
            delivered = report.delivered,
            failed = report.failed,
            "admin notification sent"
        );
        report
    }
}

pub fn format_new_booking(booking: &Booking, service: ServiceLookup<'_>) -> String {
    let mut text = String::from("📅 New booking!\n\n");
    text.push_str(&format!("👤 Name: {}\n", booking.name));
    text.push_str(&format!("📞 Phone: {}\n", booking.phone));
    text.push_str(&format!("💅 Service: {}\n", service.notification_label()));
    text.push_str(&format!("📆 Date: {}\n", booking.date));
    text.push_str(&format!("⏰ Time: {}\n", booking.time));
    if let Some(comment) = &booking.comment {
        text.push_str(&format!("💬 Comment: {comment}\n"));
    }
    text.push_str(&format!("\nBooking ID: {}\n", booking.id));
    text.push_str(&format!(
        "User ID: {}\n",
        booking.user_id.as_deref().unwrap_or("not specified")
    ));
    text.push_str(&format!(
        "Username: @{}",
        booking.username.as_deref().unwrap_or("not specified")
    ));
    text
}
