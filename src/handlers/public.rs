use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::extract::JsonBody;
use crate::models::review::{validate_rating, DEFAULT_RATING};
use crate::models::{AvailableTimes, Booking, BookingRequest, Review, ReviewInput, Service};
use crate::services::booking;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<Service>> {
    Json(queries::list_services(&state.store).await)
}

// GET /api/schedule/:date
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Json<AvailableTimes> {
    Json(AvailableTimes {
        available_times: queries::available_times(&state.store, &date).await,
    })
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<BookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = booking::create_booking(&state.store, &state.notifier, body).await?;
    Ok(Json(json!({ "success": true, "bookingId": booking.id })))
}

// GET /api/bookings/user/:user_id
pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Vec<Booking>> {
    Json(queries::bookings_for_user(&state.store, &user_id).await)
}

// GET /api/reviews
pub async fn list_reviews(State(state): State<Arc<AppState>>) -> Json<Vec<Review>> {
    Json(queries::list_reviews(&state.store).await)
}

// POST /api/reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<ReviewInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let text = body
        .text()
        .ok_or_else(|| AppError::Validation("missing required fields: text".to_string()))?;
    let rating = validate_rating(body.rating.unwrap_or(DEFAULT_RATING as i64))
        .map_err(AppError::Validation)?;

    let review = queries::create_review(&state.store, body.author(), rating, text).await?;
    tracing::info!(review_id = %review.id, rating, "review created");

    Ok(Json(json!({ "success": true, "reviewId": review.id })))
}
