use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::booking::string_or_number;
use crate::models::{Booking, BookingEdit, BookingRequest};
use crate::services::booking;
use crate::services::export::{self, EXPORT_FILE_NAME};
use crate::services::messaging::telegram::{CallbackQuery, Message, Update};
use crate::services::messaging::OutgoingMessage;
use crate::services::notify::EDIT_CALLBACK_PREFIX;
use crate::state::AppState;

/// Plain-text fallback for clients that cannot send `web_app_data`.
pub const BOOKING_DATA_PREFIX: &str = "BOOKING_DATA:";

const RECENT_LIMIT: usize = 10;

const ACCESS_DENIED: &str = "❌ You do not have access to this command.";
const NOT_FOUND: &str = "❌ Booking not found.";
const CONFIRMATION: &str = "✅ Your booking has been received! We will contact you to confirm it.";
const EDIT_USAGE: &str = "❌ Invalid format. Use:\n/editdata ID|Name|Phone|Date|Time|Comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Bookings,
    Excel,
    Edit(&'a str),
    EditData(&'a str),
}

pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let text = text.trim();
    let (head, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    // "/start@salon_bot" in group chats
    let name = head.split('@').next().unwrap_or(head);
    let args = args.trim();

    match name {
        "/start" => Some(Command::Start),
        "/bookings" => Some(Command::Bookings),
        "/excel" => Some(Command::Excel),
        "/edit" if !args.is_empty() => Some(Command::Edit(args)),
        "/editdata" if !args.is_empty() => Some(Command::EditData(args)),
        _ => None,
    }
}

/// Parses `<id>|name|phone|date|time|comment`. The id may be followed by
/// whitespace or a newline instead of the first `|`; the comment is optional.
pub fn parse_edit_data(args: &str) -> Option<(&str, BookingEdit)> {
    let args = args.trim();
    let id_end = args.find(|c: char| c == '|' || c.is_whitespace())?;
    let (id, rest) = args.split_at(id_end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('|').unwrap_or(rest);

    let mut parts = rest.splitn(5, '|').map(str::trim);
    let mut required = || parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    let name = required()?;
    let phone = required()?;
    let date = required()?;
    let time = required()?;
    let comment = required();

    Some((
        id,
        BookingEdit {
            name,
            phone,
            date,
            time,
            comment,
        },
    ))
}

/// `{type: "booking", bookingId?, data: {...}}` or the booking fields at the
/// top level.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingPayload {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    booking_id: Option<String>,
    #[serde(default)]
    data: Option<BookingRequest>,
    #[serde(flatten)]
    bare: BookingRequest,
}

pub async fn handle_update(state: &AppState, update: Update) -> anyhow::Result<()> {
    if let Some(query) = update.callback_query {
        return handle_callback(state, query).await;
    }
    let Some(message) = update.message else {
        return Ok(());
    };

    if let Some(web_app) = &message.web_app_data {
        return handle_booking_payload(state, &message, &web_app.data).await;
    }

    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    if let Some(payload) = text.strip_prefix(BOOKING_DATA_PREFIX) {
        return handle_booking_payload(state, &message, payload).await;
    }

    match parse_command(text) {
        Some(command) => handle_command(state, &message, command).await,
        None => Ok(()),
    }
}

async fn handle_command(
    state: &AppState,
    message: &Message,
    command: Command<'_>,
) -> anyhow::Result<()> {
    let chat_id = message.chat.id.to_string();
    let is_admin = state.config.is_admin(&chat_id);

    if command != Command::Start && !is_admin {
        tracing::warn!(chat_id = %chat_id, ?command, "admin command from non-admin chat");
        return reply(state, &chat_id, ACCESS_DENIED).await;
    }

    let text = match command {
        Command::Start => start_text(is_admin),
        Command::Bookings => recent_bookings_text(&queries::list_bookings(&state.store).await),
        Command::Excel => return send_export(state, &chat_id).await,
        Command::Edit(id) => match queries::get_booking(&state.store, id).await {
            Some(booking) => edit_instructions(&booking),
            None => NOT_FOUND.to_string(),
        },
        Command::EditData(args) => apply_edit(state, &chat_id, args).await?,
    };

    reply(state, &chat_id, &text).await
}

async fn handle_callback(state: &AppState, query: CallbackQuery) -> anyhow::Result<()> {
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat.id)
        .unwrap_or(query.from.id)
        .to_string();

    if !state.config.is_admin(&chat_id) {
        return state.messaging.answer_callback(&query.id, "❌ No access").await;
    }

    let Some(booking_id) = query
        .data
        .as_deref()
        .and_then(|d| d.strip_prefix(EDIT_CALLBACK_PREFIX))
    else {
        return state.messaging.answer_callback(&query.id, "").await;
    };

    match queries::get_booking(&state.store, booking_id).await {
        Some(booking) => {
            reply(state, &chat_id, &edit_instructions(&booking)).await?;
            state
                .messaging
                .answer_callback(&query.id, "✅ Open the message for instructions")
                .await
        }
        None => {
            state
                .messaging
                .answer_callback(&query.id, "❌ Booking not found")
                .await
        }
    }
}

/// A payload whose `bookingId` is already stored was persisted through the
/// REST API, so only the admin notification goes out. Anything else is a new
/// booking.
async fn handle_booking_payload(
    state: &AppState,
    message: &Message,
    raw: &str,
) -> anyhow::Result<()> {
    let payload: BookingPayload = match serde_json::from_str(raw.trim()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable booking payload");
            return Ok(());
        }
    };
    if let Some(kind) = payload.kind.as_deref().filter(|k| *k != "booking") {
        tracing::debug!(kind, "ignoring bot payload");
        return Ok(());
    }

    let chat_id = message.chat.id.to_string();
    let existing = match payload.booking_id.as_deref() {
        Some(id) => queries::get_booking(&state.store, id).await,
        None => None,
    };

    let text = match existing {
        Some(stored) => {
            booking::notify_admins(&state.store, &state.notifier, &stored).await;
            CONFIRMATION
        }
        None => {
            let mut request = payload.data.unwrap_or(payload.bare);
            if let Some(from) = &message.from {
                request.user_id.get_or_insert_with(|| from.id.to_string());
                if request.username.is_none() {
                    request.username = from.username.clone();
                }
            }
            match booking::create_booking(&state.store, &state.notifier, request).await {
                Ok(_) => CONFIRMATION,
                Err(AppError::Validation(reason)) => {
                    tracing::warn!(chat_id = %chat_id, reason = %reason, "incomplete bot booking");
                    "❌ The booking is incomplete. Please fill in all fields and try again."
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    reply(state, &chat_id, text).await
}

async fn apply_edit(state: &AppState, chat_id: &str, args: &str) -> anyhow::Result<String> {
    let Some((id, edit)) = parse_edit_data(args) else {
        return Ok(EDIT_USAGE.to_string());
    };

    match queries::update_booking(&state.store, id, &edit, chat_id).await? {
        Some(updated) => {
            tracing::info!(booking_id = %updated.id, updated_by = %chat_id, "booking edited");
            Ok("✅ Booking updated!".to_string())
        }
        None => Ok(NOT_FOUND.to_string()),
    }
}

async fn send_export(state: &AppState, chat_id: &str) -> anyhow::Result<()> {
    let bookings = queries::list_bookings(&state.store).await;
    if bookings.is_empty() {
        return reply(state, chat_id, "📝 No bookings to export.").await;
    }
    let services = queries::list_services(&state.store).await;

    let built =
        tokio::task::spawn_blocking(move || export::build_workbook(&bookings, &services)).await?;
    let bytes = match built {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to build export");
            return reply(state, chat_id, "❌ Failed to build the Excel file.").await;
        }
    };

    state
        .messaging
        .send_document(chat_id, EXPORT_FILE_NAME, bytes, "📊 Excel file with all bookings")
        .await
}

async fn reply(state: &AppState, chat_id: &str, text: &str) -> anyhow::Result<()> {
    state
        .messaging
        .send_message(chat_id, &OutgoingMessage::text(text))
        .await
}

fn start_text(is_admin: bool) -> String {
    let mut text = String::from("👋 Welcome to the nail salon bot!\n\n");
    if is_admin {
        text.push_str("🔐 You are an administrator\n\n");
        text.push_str("Available commands:\n");
        text.push_str("/bookings - View recent bookings\n");
        text.push_str("/excel - Download all bookings as Excel\n");
        text.push_str("/edit <ID> - Edit a booking\n");
    } else {
        text.push_str("Use the Mini App to book an appointment!");
    }
    text
}

/// The last bookings appended to the store, newest first.
fn recent_bookings_text(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "📝 No bookings yet.".to_string();
    }

    let mut text = String::from("📋 Recent bookings:\n\n");
    for (i, booking) in bookings.iter().rev().take(RECENT_LIMIT).enumerate() {
        text.push_str(&format!(
            "{}. {} - {} {}\n",
            i + 1,
            booking.name,
            booking.date,
            booking.time
        ));
        text.push_str(&format!("   📞 {}\n", booking.phone));
        if let Some(comment) = &booking.comment {
            text.push_str(&format!("   💬 {comment}\n"));
        }
        text.push_str(&format!("   ID: {}\n\n", booking.id));
    }
    text
}

fn edit_instructions(booking: &Booking) -> String {
    format!(
        "📝 Editing booking ID: {id}\n\n\
         Current data:\n\
         👤 Name: {name}\n\
         📞 Phone: {phone}\n\
         📆 Date: {date}\n\
         ⏰ Time: {time}\n\
         💬 Comment: {comment}\n\n\
         Send the new data as:\n\
         /editdata {id}\n\
         Name|Phone|Date|Time|Comment",
        id = booking.id,
        name = booking.name,
        phone = booking.phone,
        date = booking.date,
        time = booking.time,
        comment = booking.comment.as_deref().unwrap_or("none"),
    )
}
