//! Server-rendered HTML.
//!
//! Pages are assembled from small string builders. Every value that came from
//! a user or the database goes through [`escape`] before it is written.

pub mod account;
pub mod employees;
pub mod list;

use std::fmt::Write;

use axum::http::StatusCode;

use tower_sessions::Session;

use crate::{
    error::AppResult, identity::SignedInUser, models::ANTIFORGERY_FIELD, session,
    validation::ValidationErrors,
};

pub const LOGIN_PATH: &str = "/Identity/Account/Login";

/// What every page needs from the session: who is signed in and the token
/// to embed in forms.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<SignedInUser>,
    pub antiforgery_token: Option<String>,
}

impl PageContext {
    /// Context for pages without forms. No token is issued, so an anonymous
    /// visit does not start a session.
    pub async fn load(session: &Session) -> AppResult<Self> {
        Ok(Self {
            user: session::current_user(session).await?,
            antiforgery_token: session::existing_antiforgery_token(session).await?,
        })
    }

    /// Context for pages that render a form; issues a token if needed.
    pub async fn with_form(session: &Session) -> AppResult<Self> {
        Ok(Self {
            user: session::current_user(session).await?,
            antiforgery_token: Some(session::antiforgery_token(session).await?),
        })
    }

    pub fn token_field(&self) -> String {
        format!(
            r#"<input type="hidden" name="{ANTIFORGERY_FIELD}" value="{}" />"#,
            escape(self.antiforgery_token.as_deref().unwrap_or_default())
        )
    }
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encodes a query component, keeping only unreserved characters.
pub fn encode_query_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}

pub fn login_url(return_url: Option<&str>) -> String {
    match return_url {
        Some(url) if !url.is_empty() => {
            format!("{LOGIN_PATH}?ReturnUrl={}", encode_query_component(url))
        }
        _ => LOGIN_PATH.to_string(),
    }
}

pub fn layout(ctx: &PageContext, title: &str, body: &str) -> String {
    let account = match &ctx.user {
        Some(user) => format!(
            r#"<span class="user">Hello {}!</span>
      <form method="post" action="/Identity/Account/Logout">{}<button type="submit">Logout</button></form>"#,
            escape(&user.email),
            ctx.token_field()
        ),
        None => r#"<a href="/Identity/Account/Register">Register</a>
      <a href="/Identity/Account/Login">Login</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title} - Employee Roster</title>
  <link rel="stylesheet" href="/static/site.css" />
</head>
<body>
  <header>
    <nav>
      <a href="/">Employee Roster</a>
      <a href="/Employee">Employees</a>
      <a href="/List">Qualifications</a>
      <div class="account">
      {account}
      </div>
    </nav>
  </header>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Standalone page for error responses; rendered without a session.
pub fn error_page(status: StatusCode, title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title} - Employee Roster</title>
  <link rel="stylesheet" href="/static/site.css" />
</head>
<body>
  <main>
    <h1>{title}</h1>
    <p class="status">{code}</p>
    <p>{message}</p>
    <p><a href="/">Back to the employee list</a></p>
  </main>
</body>
</html>
"#,
        title = escape(title),
        code = status.as_u16(),
        message = escape(message),
    )
}

pub(crate) fn field_errors(errors: &ValidationErrors, field: &str) -> String {
    errors
        .for_field(field)
        .map(|message| {
            format!(
                r#"<span class="field-error" data-valmsg-for="{field}">{}</span>"#,
                escape(message)
            )
        })
        .collect()
}

pub(crate) fn input_field(
    errors: &ValidationErrors,
    name: &str,
    label: &str,
    kind: &str,
    value: &str,
) -> String {
    format!(
        r#"    <div class="field">
      <label for="{name}">{label}</label>
      <input id="{name}" name="{name}" type="{kind}" value="{value}" />
      {errors}
    </div>
"#,
        label = escape(label),
        value = escape(value),
        errors = field_errors(errors, name),
    )
}
