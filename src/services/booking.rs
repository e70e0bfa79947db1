use crate::db::{queries, JsonStore};
use crate::errors::AppError;
use crate::models::{Booking, BookingRequest, ServiceLookup};
use crate::services::notify::AdminNotifier;

/// Validates presence, appends the booking, then notifies admins.
///
/// The write is committed before notifying; delivery failures are isolated
/// inside the notifier and never undo or fail the booking.
pub async fn create_booking(
    store: &JsonStore,
    notifier: &AdminNotifier,
    request: BookingRequest,
) -> Result<Booking, AppError> {
    let new = request.into_new_booking().map_err(|missing| {
        AppError::Validation(format!("missing required fields: {}", missing.join(", ")))
    })?;

    let booking = queries::insert_booking(store, new).await?;
    tracing::info!(booking_id = %booking.id, date = %booking.date, time = %booking.time, "booking created");

    notify_admins(store, notifier, &booking).await;

    Ok(booking)
}

pub async fn notify_admins(store: &JsonStore, notifier: &AdminNotifier, booking: &Booking) {
    let services = queries::list_services(store).await;
    let lookup = ServiceLookup::resolve(&services, &booking.service_id);
    notifier.notify_new_booking(booking, lookup).await;
}
