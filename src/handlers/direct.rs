use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::handlers::extract::JsonBody;
use crate::services::messaging::OutgoingMessage;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DirectBookingRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub datetime: Option<String>,
    pub comment: Option<String>,
}

struct DirectBooking<'a> {
    name: &'a str,
    phone: &'a str,
    service: &'a str,
    datetime: &'a str,
    comment: Option<&'a str>,
}

impl DirectBookingRequest {
    fn validate(&self) -> Option<DirectBooking<'_>> {
        Some(DirectBooking {
            name: field(&self.name)?,
            phone: field(&self.phone)?,
            service: field(&self.service)?,
            datetime: field(&self.datetime)?,
            comment: field(&self.comment),
        })
    }
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// POST /api/telegram/direct
//
// Relays the form straight to the configured chat without persisting it.
pub async fn send_direct(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<DirectBookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = body.validate().ok_or_else(|| {
        AppError::Validation("Missing required fields: name, phone, service, datetime".to_string())
    })?;

    let config = &state.config;
    if config.bot_token.is_empty() || config.direct_chat_id.is_empty() {
        return Err(AppError::Config(
            "Telegram credentials not configured. Set BOT_TOKEN and CHAT_ID environment variables."
                .to_string(),
        ));
    }

    let message = OutgoingMessage::text(format_direct_message(&booking)).html();
    state
        .messaging
        .send_message(&config.direct_chat_id, &message)
        .await
        .map_err(|e| AppError::Messaging(e.to_string()))?;

    tracing::info!(chat_id = %config.direct_chat_id, "direct booking relayed");
    Ok(Json(json!({
        "success": true,
        "message": "Booking sent to Telegram!",
    })))
}

fn format_direct_message(booking: &DirectBooking<'_>) -> String {
    let mut text = String::from("🟣 NEW BOOKING 🟣\n\n");
    text.push_str(&format!("👤 Name: {}\n", escape_html(booking.name)));
    text.push_str(&format!("📞 Phone: {}\n", escape_html(booking.phone)));
    text.push_str(&format!("💅 Service: {}\n", escape_html(booking.service)));
    text.push_str(&format!(
        "📅 Date and time: {}\n",
        escape_html(&format_datetime(booking.datetime))
    ));
    if let Some(comment) = booking.comment {
        text.push_str(&format!("\n💬 Comment:\n{}\n", escape_html(comment)));
    }
    text
}

/// `2025-06-01T10:00` → `01.06.2025 (Sunday) 10:00`; unparsable input is
/// passed through.
fn format_datetime(raw: &str) -> String {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%d.%m.%Y (%A) %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime("2025-06-01T10:00"), "01.06.2025 (Sunday) 10:00");
        assert_eq!(format_datetime("2025-06-02 09:30"), "02.06.2025 (Monday) 09:30");
        assert_eq!(format_datetime("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>Tom & "Jerry"</b>'s"#),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;&#039;s"
        );
    }

    #[test]
    fn test_validate_requires_all_fields() {
        let request = DirectBookingRequest {
            name: Some("Anna".to_string()),
            phone: Some("+79990001122".to_string()),
            service: Some(" ".to_string()),
            datetime: Some("2025-06-01T10:00".to_string()),
            comment: None,
        };
        assert!(request.validate().is_none());
    }

    #[test]
    fn test_format_direct_message() {
        let request = DirectBookingRequest {
            name: Some("Anna <3".to_string()),
            phone: Some("+79990001122".to_string()),
            service: Some("Manicure".to_string()),
            datetime: Some("2025-06-01T10:00".to_string()),
            comment: Some("gel".to_string()),
        };
        let text = format_direct_message(&request.validate().unwrap());
        assert!(text.contains("👤 Name: Anna &lt;3"));
        assert!(text.contains("📅 Date and time: 01.06.2025 (Sunday) 10:00"));
        assert!(text.ends_with("💬 Comment:\ngel\n"));
    }
}
