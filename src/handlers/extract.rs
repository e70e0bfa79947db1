use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections (bad syntax, wrong field types, missing
/// content type) answer with the usual 400 error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
