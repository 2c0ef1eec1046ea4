use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod auth;
pub mod health;
pub mod item;

/// `Json` whose rejections use the service's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections use the service's error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
