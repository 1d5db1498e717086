//! Cookie sessions on top of `tower-sessions`.
//!
//! A session holds the anti-forgery token rendered into forms and, once
//! signed in, the authenticated user. Sessions are only written when one of
//! those values is set, so requests that never render a form or sign in
//! (health checks, static files, plain pages) leave nothing behind.

use std::time::Duration;

use subtle::ConstantTimeEq;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, cookie::SameSite};
use uuid::Uuid;

use crate::{error::AppResult, identity::SignedInUser};

pub const SESSION_COOKIE: &str = "roster.session";

const USER_KEY: &str = "user";
const ANTIFORGERY_KEY: &str = "antiforgery_token";

/// Session layer backed by process memory, expiring after `idle_timeout`
/// without a request.
pub fn session_layer(
    idle_timeout: Duration,
    secure_cookie: bool,
) -> SessionManagerLayer<MemoryStore> {
    let idle = time::Duration::try_from(idle_timeout).unwrap_or(time::Duration::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_path("/")
        .with_secure(secure_cookie)
        .with_expiry(Expiry::OnInactivity(idle))
}

pub async fn current_user(session: &Session) -> AppResult<Option<SignedInUser>> {
    Ok(session.get::<SignedInUser>(USER_KEY).await?)
}

/// The token already issued to this session, if any.
pub async fn existing_antiforgery_token(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(ANTIFORGERY_KEY).await?)
}

/// Returns the session's token, issuing one first if the session has none.
pub async fn antiforgery_token(session: &Session) -> AppResult<String> {
    if let Some(token) = existing_antiforgery_token(session).await? {
        return Ok(token);
    }

    let token = random_token();
    session.insert(ANTIFORGERY_KEY, &token).await?;
    Ok(token)
}

/// Compares a submitted token against the session's token in constant time.
pub async fn verify_antiforgery_token(session: &Session, submitted: &str) -> AppResult<bool> {
    let Some(expected) = existing_antiforgery_token(session).await? else {
        return Ok(false);
    };

    Ok(tokens_match(&expected, submitted))
}

/// Attaches `user` under a new session id and token; the old id stops
/// working.
pub async fn sign_in(session: &Session, user: &SignedInUser) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_KEY, user).await?;
    session.insert(ANTIFORGERY_KEY, random_token()).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.cycle_id().await?;
    session.remove::<SignedInUser>(USER_KEY).await?;
    session.insert(ANTIFORGERY_KEY, random_token()).await?;
    Ok(())
}

fn tokens_match(expected: &str, submitted: &str) -> bool {
    !submitted.is_empty() && bool::from(expected.as_bytes().ct_eq(submitted.as_bytes()))
}

fn random_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
