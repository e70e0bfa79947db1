mod common;

use serde_json::json;

use salon_booking::bot::commands::handle_update;
use salon_booking::db::{queries, Collection};
use salon_booking::models::{Booking, BookingStatus};
use salon_booking::services::messaging::telegram::Update;

use common::*;

fn text_update(chat_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id },
            "from": { "id": chat_id, "username": "someone", "first_name": "Some" },
            "text": text
        }
    }))
    .unwrap()
}

fn web_app_update(chat_id: i64, data: serde_json::Value) -> Update {
    serde_json::from_value(json!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "chat": { "id": chat_id },
            "from": { "id": chat_id, "username": "client" },
            "web_app_data": { "data": data.to_string() }
        }
    }))
    .unwrap()
}

fn callback_update(chat_id: i64, data: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 3,
        "callback_query": {
            "id": "cb-1",
            "from": { "id": chat_id },
            "message": { "message_id": 12, "chat": { "id": chat_id } },
            "data": data
        }
    }))
    .unwrap()
}

async fn seed_booking(app: &TestApp, id: &str) {
    let booking = Booking {
        id: id.to_string(),
        name: "Anna".to_string(),
        phone: "+79990001122".to_string(),
        service_id: "1".to_string(),
        date: "2025-06-01".to_string(),
        time: "10:00".to_string(),
        comment: Some("gel".to_string()),
        user_id: Some("555".to_string()),
        username: None,
        status: BookingStatus::Pending,
        created_at: chrono::Utc::now(),
        updated_at: None,
        updated_by: None,
    };
    app.store()
        .write(Collection::Bookings, std::slice::from_ref(&booking))
        .await
        .unwrap();
}

fn last_text(app: &TestApp, chat_id: &str) -> String {
    app.messaging
        .sent_to(chat_id)
        .last()
        .map(|m| m.message.text.clone())
        .unwrap_or_default()
}

// ── Commands ──

#[tokio::test]
async fn test_start_greets_and_lists_admin_commands() {
    let app = setup().await;

    handle_update(&app.state, text_update(100, "/start")).await.unwrap();
    assert!(last_text(&app, "100").contains("/excel"));

    handle_update(&app.state, text_update(999, "/start")).await.unwrap();
    let text = last_text(&app, "999");
    assert!(text.contains("Mini App"));
    assert!(!text.contains("/excel"));
}

#[tokio::test]
async fn test_admin_commands_denied_for_other_chats() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    for command in ["/bookings", "/excel", "/edit 42", "/editdata 42|A|B|C|D"] {
        handle_update(&app.state, text_update(999, command)).await.unwrap();
        assert_eq!(
            last_text(&app, "999"),
            "❌ You do not have access to this command."
        );
    }
    assert!(app.messaging.documents().is_empty());
    assert_eq!(queries::get_booking(app.store(), "42").await.unwrap().name, "Anna");
}

#[tokio::test]
async fn test_bookings_command() {
    let app = setup().await;

    handle_update(&app.state, text_update(100, "/bookings")).await.unwrap();
    assert_eq!(last_text(&app, "100"), "📝 No bookings yet.");

    seed_booking(&app, "42").await;
    handle_update(&app.state, text_update(100, "/bookings")).await.unwrap();
    let text = last_text(&app, "100");
    assert!(text.contains("1. Anna - 2025-06-01 10:00"));
    assert!(text.contains("ID: 42"));
}

#[tokio::test]
async fn test_excel_command() {
    let app = setup().await;

    handle_update(&app.state, text_update(100, "/excel")).await.unwrap();
    assert_eq!(last_text(&app, "100"), "📝 No bookings to export.");
    assert!(app.messaging.documents().is_empty());

    seed_booking(&app, "42").await;
    handle_update(&app.state, text_update(100, "/excel")).await.unwrap();
    let documents = app.messaging.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].chat_id, "100");
    assert_eq!(documents[0].file_name, "bookings.xlsx");
    assert!(documents[0].bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_edit_command() {
    let app = setup().await;

    handle_update(&app.state, text_update(100, "/edit 42")).await.unwrap();
    assert_eq!(last_text(&app, "100"), "❌ Booking not found.");

    seed_booking(&app, "42").await;
    handle_update(&app.state, text_update(100, "/edit 42")).await.unwrap();
    let text = last_text(&app, "100");
    assert!(text.contains("👤 Name: Anna"));
    assert!(text.contains("💬 Comment: gel"));
    assert!(text.contains("/editdata 42"));
}

#[tokio::test]
async fn test_editdata_updates_booking() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    handle_update(
        &app.state,
        text_update(100, "/editdata 42\nOlga|+79995556677|2025-06-03|12:30|no polish"),
    )
    .await
    .unwrap();
    assert_eq!(last_text(&app, "100"), "✅ Booking updated!");

    let booking = queries::get_booking(app.store(), "42").await.unwrap();
    assert_eq!(booking.name, "Olga");
    assert_eq!(booking.phone, "+79995556677");
    assert_eq!(booking.date, "2025-06-03");
    assert_eq!(booking.time, "12:30");
    assert_eq!(booking.comment.as_deref(), Some("no polish"));
    assert_eq!(booking.updated_by.as_deref(), Some("100"));
    assert!(booking.updated_at.is_some());
    assert_eq!(booking.user_id.as_deref(), Some("555"));
}

#[tokio::test]
async fn test_editdata_bad_format_and_unknown_id() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    handle_update(&app.state, text_update(100, "/editdata 42|Olga")).await.unwrap();
    assert!(last_text(&app, "100").starts_with("❌ Invalid format."));

    handle_update(&app.state, text_update(100, "/editdata 7|Olga|+7|2025-06-03|12:30"))
        .await
        .unwrap();
    assert_eq!(last_text(&app, "100"), "❌ Booking not found.");
    assert_eq!(queries::get_booking(app.store(), "42").await.unwrap().name, "Anna");
}

// ── Callbacks ──

#[tokio::test]
async fn test_edit_callback() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    handle_update(&app.state, callback_update(200, "edit_42")).await.unwrap();
    assert!(last_text(&app, "200").starts_with("📝 Editing booking ID: 42"));
    let callbacks = app.messaging.callbacks();
    assert_eq!(callbacks.len(), 1);
    assert_eq!(callbacks[0].0, "cb-1");

    handle_update(&app.state, callback_update(200, "edit_missing")).await.unwrap();
    assert_eq!(app.messaging.callbacks()[1].1, "❌ Booking not found");
}

#[tokio::test]
async fn test_edit_callback_denied_for_non_admin() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    handle_update(&app.state, callback_update(999, "edit_42")).await.unwrap();
    assert!(app.messaging.sent().is_empty());
    assert_eq!(app.messaging.callbacks()[0].1, "❌ No access");
}

// ── Booking Payloads ──

#[tokio::test]
async fn test_web_app_payload_creates_booking() {
    let app = setup().await;

    let payload = json!({
        "type": "booking",
        "data": {
            "name": "Olga",
            "phone": "+79993334455",
            "serviceId": "1",
            "date": "2025-06-05",
            "time": "16:00"
        }
    });
    handle_update(&app.state, web_app_update(555, payload)).await.unwrap();

    let bookings = queries::list_bookings(app.store()).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].user_id.as_deref(), Some("555"));
    assert_eq!(bookings[0].username.as_deref(), Some("client"));

    assert_eq!(app.messaging.sent_to("100").len(), 1);
    assert_eq!(app.messaging.sent_to("200").len(), 1);
    assert!(last_text(&app, "555").starts_with("✅ Your booking has been received!"));
}

#[tokio::test]
async fn test_bare_payload_creates_booking() {
    let app = setup().await;

    let payload = json!({
        "name": "Olga",
        "phone": "+79993334455",
        "service": "Pedicure",
        "datetime": "2025-06-05T16:00",
        "userId": 777
    });
    handle_update(
        &app.state,
        text_update(555, &format!("BOOKING_DATA:{payload}")),
    )
    .await
    .unwrap();

    let bookings = queries::list_bookings(app.store()).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].service_id, "Pedicure");
    assert_eq!(bookings[0].time, "16:00");
    assert_eq!(bookings[0].user_id.as_deref(), Some("777"));
    assert!(last_text(&app, "555").starts_with("✅"));
}

#[tokio::test]
async fn test_text_payload_for_stored_booking_only_notifies() {
    let app = setup().await;
    seed_booking(&app, "42").await;

    let payload = json!({ "type": "booking", "bookingId": 42, "data": { "name": "Anna" } });
    handle_update(
        &app.state,
        text_update(555, &format!("BOOKING_DATA:{payload}")),
    )
    .await
    .unwrap();

    assert_eq!(queries::list_bookings(app.store()).await.len(), 1);
    let admin = app.messaging.sent_to("100");
    assert_eq!(admin.len(), 1);
    assert!(admin[0].message.text.contains("Booking ID: 42"));
    assert!(last_text(&app, "555").starts_with("✅"));
}

#[tokio::test]
async fn test_incomplete_payload_is_rejected() {
    let app = setup().await;

    let payload = json!({ "type": "booking", "data": { "name": "Olga" } });
    handle_update(&app.state, web_app_update(555, payload)).await.unwrap();

    assert!(queries::list_bookings(app.store()).await.is_empty());
    assert!(app.messaging.sent_to("100").is_empty());
    assert!(last_text(&app, "555").starts_with("❌ The booking is incomplete."));
}

#[tokio::test]
async fn test_unrelated_payloads_are_ignored() {
    let app = setup().await;

    handle_update(&app.state, web_app_update(555, json!({ "type": "feedback" })))
        .await
        .unwrap();
    handle_update(&app.state, text_update(555, "BOOKING_DATA:not json"))
        .await
        .unwrap();
    handle_update(&app.state, text_update(555, "hello there"))
        .await
        .unwrap();

    assert!(app.messaging.sent().is_empty());
    assert!(queries::list_bookings(app.store()).await.is_empty());
}
