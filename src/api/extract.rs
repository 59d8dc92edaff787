// src/api/extract.rs
use axum::extract::FromRequest;

use super::error::ApiError;

/// `Json` whose rejections answer as `ApiError` (400 with a `{"detail": ...}` body).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
