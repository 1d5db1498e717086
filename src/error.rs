use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{identity::IdentityError, views};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("anti-forgery token missing or invalid")]
    AntiForgery,
    #[error("authentication required for {return_url}")]
    Unauthenticated { return_url: String },
    #[error("concurrency conflict: {0}")]
    Conflict(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("identity error")]
    Identity(#[from] IdentityError),
    #[error("session error")]
    Session(#[from] tower_sessions::session::Error),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::AntiForgery => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::SEE_OTHER,
            Self::Conflict(_)
            | Self::Database(_)
            | Self::Migration(_)
            | Self::Identity(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (title, message) = match &self {
            Self::Unauthenticated { return_url } => {
                return Redirect::to(&views::login_url(Some(return_url))).into_response();
            }
            Self::NotFound(msg) => {
                warn!(reason = %msg, "not found");
                ("Not found", "The requested resource does not exist.".to_string())
            }
            Self::BadRequest(msg) => {
                warn!(reason = %msg, "bad request");
                ("Bad request", msg.clone())
            }
            Self::AntiForgery => {
                warn!("rejected submission with missing or invalid anti-forgery token");
                (
                    "Bad request",
                    "The form could not be verified. Reload the page and try again.".to_string(),
                )
            }
            Self::Database(err) => {
                error!(error = %err, "database operation failed");
                generic_error()
            }
            Self::Migration(err) => {
                error!(error = %err, "database migration failed");
                generic_error()
            }
            Self::Identity(err) => {
                error!(error = %err, "identity operation failed");
                generic_error()
            }
            Self::Session(err) => {
                error!(error = %err, "session store failed");
                generic_error()
            }
            Self::Conflict(msg) | Self::Internal(msg) => {
                error!(error = %msg, "request failed");
                generic_error()
            }
        };

        (status, Html(views::error_page(status, title, &message))).into_response()
    }
}

fn generic_error() -> (&'static str, String) {
    (
        "Error",
        "An error occurred while processing your request.".to_string(),
    )
}
