pub mod admin;
pub mod direct;
pub mod extract;
pub mod health;
pub mod public;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/services", get(public::list_services))
        .route("/api/schedule/:date", get(public::get_schedule))
        .route("/api/bookings", post(public::create_booking))
        .route("/api/bookings/user/:user_id", get(public::user_bookings))
        .route(
            "/api/reviews",
            get(public::list_reviews).post(public::create_review),
        )
        .route("/api/telegram/direct", post(direct::send_direct))
        .route("/api/admin/check/:user_id", get(admin::check_admin))
        .route(
            "/api/admin/services",
            get(admin::list_services).post(admin::create_service),
        )
        .route(
            "/api/admin/services/:id",
            get(admin::get_service)
                .put(admin::update_service)
                .delete(admin::delete_service),
        )
        .route(
            "/api/admin/schedule",
            get(admin::list_schedule).post(admin::save_schedule),
        )
        .route(
            "/api/admin/schedule/:date",
            axum::routing::delete(admin::delete_schedule),
        )
        .route(
            "/api/admin/reviews/:id",
            put(admin::update_review).delete(admin::delete_review),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route("/api/admin/export/excel", get(admin::export_excel))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
