use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(deserialize_with = "super::id_string")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Bookings never leave `pending`; nothing in the salon flow confirms them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
        }
    }
}

/// Raw submission as sent by the Mini App form, the bot event channel, or any
/// other client. Every field is optional so that presence can be reported
/// back as a 400 instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "service")]
    pub service_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub datetime: Option<String>,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", alias = "user_id")]
    pub user_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub comment: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

impl BookingRequest {
    /// Checks presence of the required fields and returns the list of the
    /// missing ones when the request is incomplete.
    pub fn into_new_booking(self) -> Result<NewBooking, Vec<&'static str>> {
        let (split_date, split_time) = match self.datetime.as_deref().map(str::trim) {
            Some(dt) if !dt.is_empty() => split_datetime(dt),
            _ => (None, None),
        };

        let name = non_empty(self.name);
        let phone = non_empty(self.phone);
        let service_id = non_empty(self.service_id);
        let date = non_empty(self.date).or(split_date);
        let time = non_empty(self.time).or(split_time);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if phone.is_none() {
            missing.push("phone");
        }
        if service_id.is_none() {
            missing.push("service");
        }
        if date.is_none() {
            missing.push("date");
        }
        if time.is_none() {
            missing.push("time");
        }

        match (name, phone, service_id, date, time) {
            (Some(name), Some(phone), Some(service_id), Some(date), Some(time)) => Ok(NewBooking {
                name,
                phone,
                service_id,
                date,
                time,
                comment: non_empty(self.comment),
                user_id: non_empty(self.user_id),
                username: non_empty(self.username),
            }),
            _ => Err(missing),
        }
    }
}

/// Fields an admin may rewrite with the bot's edit command.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingEdit {
    pub name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub comment: Option<String>,
}

// "2025-06-01T10:00" (datetime-local input) or "2025-06-01 10:00[:ss]"
fn split_datetime(dt: &str) -> (Option<String>, Option<String>) {
    match dt.split_once(|c: char| c == 'T' || c == ' ') {
        Some((date, time)) => {
            let time: String = time.chars().take(5).collect();
            (non_empty(Some(date.to_string())), non_empty(Some(time)))
        }
        None => (non_empty(Some(dt.to_string())), None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Chat clients send user ids as JSON numbers; older records store strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
