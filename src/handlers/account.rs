use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppResult,
    extract::{AntiForgeryForm, CurrentSession},
    identity::{self, IdentityError},
    models::{ConfirmEmailQuery, LoginForm, LoginQuery, RegisterForm, TokenOnlyForm},
    session,
    state::AppState,
    validation::ValidationErrors,
    views::{self, PageContext},
};

/// Only same-site paths are followed after login.
fn local_return_url(raw: &str) -> &str {
    let is_local = raw.starts_with('/') && !raw.starts_with("//") && !raw.starts_with("/\\");
    if is_local { raw } else { "/" }
}

pub async fn register_form(CurrentSession(session): CurrentSession) -> AppResult<Html<String>> {
    Ok(Html(views::account::register_form(
        &PageContext::with_form(&session).await?,
        &RegisterForm::default(),
        &ValidationErrors::new(),
    )))
}

pub async fn register(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    AntiForgeryForm(form): AntiForgeryForm<RegisterForm>,
) -> AppResult<Html<String>> {
    let ctx = PageContext::with_form(&session).await?;

    if let Err(errors) =
        identity::validate_registration(&form.email, &form.password, &form.confirm_password)
    {
        return Ok(Html(views::account::register_form(&ctx, &form, &errors)));
    }

    match state.identity.register(&form.email, &form.password).await {
        Ok(pending) => {
            let link = state
                .config
                .environment
                .is_development()
                .then(|| pending.confirmation_path());
            Ok(Html(views::account::register_confirmation(
                &ctx,
                &pending.email,
                link.as_deref(),
            )))
        }
        Err(err @ IdentityError::DuplicateEmail(_)) => {
            let mut errors = ValidationErrors::new();
            errors.push("email", format!("{}.", capitalize(&err.to_string())));
            Ok(Html(views::account::register_form(&ctx, &form, &errors)))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn confirm_email(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ConfirmEmailQuery>,
) -> AppResult<Response> {
    let (Some(user_id), Some(code)) = (query.user_id, query.code) else {
        return Ok(Redirect::to("/").into_response());
    };

    let confirmed = match Uuid::parse_str(&user_id) {
        Ok(user_id) => match state.identity.confirm_email(user_id, &code).await {
            Ok(()) => true,
            Err(IdentityError::InvalidConfirmation) => {
                warn!(user_id = %user_id, "invalid confirmation code");
                false
            }
            Err(err) => return Err(err.into()),
        },
        Err(_) => false,
    };

    Ok(Html(views::account::confirm_email_result(
        &PageContext::load(&session).await?,
        confirmed,
    ))
    .into_response())
}

pub async fn login_form(
    CurrentSession(session): CurrentSession,
    Query(query): Query<LoginQuery>,
) -> AppResult<Html<String>> {
    let form = LoginForm {
        return_url: query.return_url.unwrap_or_default(),
        ..LoginForm::default()
    };

    Ok(Html(views::account::login_form(
        &PageContext::with_form(&session).await?,
        &form,
        &ValidationErrors::new(),
    )))
}

pub async fn login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    AntiForgeryForm(form): AntiForgeryForm<LoginForm>,
) -> AppResult<Response> {
    let mut errors = ValidationErrors::new();
    if form.email.trim().is_empty() {
        errors.push("email", "The Email field is required.");
    }
    if form.password.is_empty() {
        errors.push("password", "The Password field is required.");
    }

    if errors.is_empty() {
        match state.identity.sign_in(&form.email, &form.password).await {
            Ok(user) => {
                session::sign_in(&session, &user).await?;
                return Ok(Redirect::to(local_return_url(&form.return_url)).into_response());
            }
            Err(IdentityError::InvalidCredentials) => {
                errors.push("", "Invalid login attempt.");
            }
            Err(IdentityError::NotConfirmed) => {
                info!("sign-in refused for unconfirmed account");
                errors.push("", "You must confirm your account before signing in.");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(Html(views::account::login_form(
        &PageContext::with_form(&session).await?,
        &form,
        &errors,
    ))
    .into_response())
}

pub async fn logout(
    CurrentSession(session): CurrentSession,
    AntiForgeryForm(_form): AntiForgeryForm<TokenOnlyForm>,
) -> AppResult<Redirect> {
    if let Some(user) = session::current_user(&session).await? {
        info!(user_id = %user.id, "user signed out");
    }

    session::sign_out(&session).await?;
    Ok(Redirect::to("/"))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
