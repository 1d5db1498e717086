use axum::{
    Form,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use crate::{
    error::AppError,
    identity::SignedInUser,
    models::{DeleteForm, EmployeeForm, LoginForm, RegisterForm, TokenOnlyForm},
    session,
};

fn session_from_extensions(extensions: &axum::http::Extensions) -> Result<Session, AppError> {
    extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::internal("session layer is not installed"))
}

/// The request's session, as installed by the session layer.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_from_extensions(&parts.extensions).map(Self)
    }
}

/// Rejects anonymous requests with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct RequireUser(pub SignedInUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_extensions(&parts.extensions)?;

        session::current_user(&session)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthenticated {
                return_url: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string()),
            })
    }
}

/// Forms that carry the hidden anti-forgery field.
pub trait AntiForgeryProtected {
    fn request_token(&self) -> &str;
}

macro_rules! antiforgery_protected {
    ($($form:ty),* $(,)?) => {
        $(
            impl AntiForgeryProtected for $form {
                fn request_token(&self) -> &str {
                    &self.request_token
                }
            }
        )*
    };
}

antiforgery_protected!(EmployeeForm, DeleteForm, TokenOnlyForm, RegisterForm, LoginForm);

/// A url-encoded form whose anti-forgery token matched the session's token.
/// Verification happens before the handler body runs.
#[derive(Debug, Clone)]
pub struct AntiForgeryForm<T>(pub T);

impl<S, T> FromRequest<S> for AntiForgeryForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + AntiForgeryProtected + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_extensions(req.extensions())?;

        let Form(form) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if !session::verify_antiforgery_token(&session, form.request_token()).await? {
            return Err(AppError::AntiForgery);
        }

        Ok(Self(form))
    }
}
