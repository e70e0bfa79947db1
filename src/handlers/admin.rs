use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::extract::JsonBody;
use crate::models::review::validate_rating;
use crate::models::{Booking, ReviewInput, ScheduleEntry, ScheduleInput, Service, ServiceInput, ServiceLookup};
use crate::services::export::{self, EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
use crate::services::init_data::verify_init_data;
use crate::state::AppState;

pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Admin calls carry either the static bearer token or the Mini App init
/// data of a user listed in `ADMIN_IDS`.
fn check_auth(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    let config = &state.config;

    if !config.admin_token.is_empty() {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");
        if token == config.admin_token {
            return Ok(());
        }
    }

    if let Some(init_data) = headers.get(INIT_DATA_HEADER).and_then(|v| v.to_str().ok()) {
        if config.bot_token.is_empty() {
            tracing::warn!("init data received but BOT_TOKEN is not configured");
            return Err(AppError::Unauthorized);
        }
        match verify_init_data(init_data, &config.bot_token, config.init_data_max_age_secs) {
            Ok(user) if config.is_admin(&user.id.to_string()) => return Ok(()),
            Ok(user) => tracing::warn!(user_id = user.id, "non-admin attempted admin call"),
            Err(e) => tracing::warn!(error = %e, "rejected init data"),
        }
    }

    Err(AppError::Unauthorized)
}

// GET /api/admin/check/:user_id
pub async fn check_admin(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<serde_json::Value> {
    Json(json!({ "isAdmin": state.config.is_admin(&user_id) }))
}

// ── Services ──

// GET /api/admin/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, AppError> {
    check_auth(&headers, &state)?;
    Ok(Json(queries::list_services(&state.store).await))
}

// POST /api/admin/services
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<ServiceInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("missing required fields: name".to_string()))?;
    let description = body.description.filter(|d| !d.trim().is_empty());

    let service = queries::create_service(
        &state.store,
        name.to_string(),
        description,
        body.price.unwrap_or_default(),
    )
    .await?;
    tracing::info!(service_id = %service.id, name = %service.name, "service created");

    Ok(Json(json!({ "success": true, "serviceId": service.id })))
}

// GET /api/admin/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    check_auth(&headers, &state)?;
    queries::get_service(&state.store, &id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))
}

// PUT /api/admin/services/:id
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ServiceInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    match queries::update_service(&state.store, &id, &body).await? {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err(AppError::NotFound("service not found".to_string())),
    }
}

// DELETE /api/admin/services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    let removed = queries::delete_service(&state.store, &id).await?;
    tracing::info!(service_id = %id, removed, "service delete");
    Ok(Json(json!({ "success": true })))
}

// ── Schedule ──

// GET /api/admin/schedule
pub async fn list_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ScheduleEntry>>, AppError> {
    check_auth(&headers, &state)?;
    Ok(Json(queries::list_schedule(&state.store).await))
}

// POST /api/admin/schedule
pub async fn save_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<ScheduleInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    let entry = body
        .into_entry()
        .ok_or_else(|| AppError::Validation("missing required fields: date".to_string()))?;
    tracing::info!(date = %entry.date, slots = entry.times.len(), "schedule saved");
    queries::upsert_schedule(&state.store, entry).await?;

    Ok(Json(json!({ "success": true })))
}

// DELETE /api/admin/schedule/:date
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;
    queries::delete_schedule(&state.store, &date).await?;
    Ok(Json(json!({ "success": true })))
}

// ── Reviews ──

// PUT /api/admin/reviews/:id
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ReviewInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    let rating = body
        .rating
        .map(validate_rating)
        .transpose()
        .map_err(AppError::Validation)?;

    match queries::update_review(&state.store, &id, body.author(), rating, body.text()).await? {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err(AppError::NotFound("review not found".to_string())),
    }
}

// DELETE /api/admin/reviews/:id
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;
    queries::delete_review(&state.store, &id).await?;
    Ok(Json(json!({ "success": true })))
}

// ── Bookings ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingResponse {
    #[serde(flatten)]
    booking: Booking,
    service_name: String,
}

// GET /api/admin/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminBookingResponse>>, AppError> {
    check_auth(&headers, &state)?;

    let mut bookings = queries::list_bookings(&state.store).await;
    let services = queries::list_services(&state.store).await;
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let response = bookings
        .into_iter()
        .map(|booking| {
            let service_name = ServiceLookup::resolve(&services, &booking.service_id)
                .display_name()
                .to_string();
            AdminBookingResponse {
                booking,
                service_name,
            }
        })
        .collect();

    Ok(Json(response))
}

// GET /api/admin/export/excel
pub async fn export_excel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    check_auth(&headers, &state)?;

    let bookings = queries::list_bookings(&state.store).await;
    let services = queries::list_services(&state.store).await;
    let rows = bookings.len();

    let bytes = tokio::task::spawn_blocking(move || export::build_workbook(&bookings, &services))
        .await
        .map_err(|e| AppError::Export(e.to_string()))?
        .map_err(|e| AppError::Export(e.to_string()))?;
    tracing::info!(rows, bytes = bytes.len(), "bookings exported");

    let disposition = format!("attachment; filename={EXPORT_FILE_NAME}");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        bytes,
    )
        .into_response())
}
