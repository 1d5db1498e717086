pub mod account;
pub mod employees;
pub mod list;

use axum::Json;

use crate::{
    error::{AppError, AppResult},
    models::HealthStatus,
};

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

pub async fn not_found() -> AppResult<()> {
    Err(AppError::not_found("no route matches the request"))
}
