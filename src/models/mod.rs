pub mod booking;
pub mod review;
pub mod schedule;
pub mod service;

pub use booking::{Booking, BookingEdit, BookingRequest, BookingStatus, NewBooking};
pub use review::{Review, ReviewInput};
pub use schedule::{AvailableTimes, ScheduleEntry, ScheduleInput};
pub use service::{Service, ServiceInput, ServiceLookup, NOT_SPECIFIED};

use serde::{Deserialize, Deserializer};

/// `null` reads as `T::default()`; `#[serde(default)]` only covers absent keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids typed into the data files by hand are sometimes bare numbers.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}
