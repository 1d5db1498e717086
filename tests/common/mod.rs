#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use employee_roster::{
    AppState, build_router, config::AppConfig, session::SESSION_COOKIE,
    views::encode_query_component,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// The anti-forgery token embedded in the page's first form.
    pub fn token(&self) -> String {
        let marker = r#"name="__RequestVerificationToken" value=""#;
        let start = self
            .body
            .find(marker)
            .map(|index| index + marker.len())
            .expect("page should contain an anti-forgery token");
        let end = self.body[start..]
            .find('"')
            .expect("token attribute should be closed");
        self.body[start..start + end].to_string()
    }
}

/// Drives the router in-process and keeps the session cookie between calls,
/// the way a browser would.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            app: build_router(state),
            cookie: None,
        }
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self
            .request(Method::GET, uri)
            .body(Body::empty())
            .expect("request should build");
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    encode_query_component(name),
                    encode_query_component(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request(Method::POST, uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request should build");
        self.send(request).await
    }

    /// Fetches a fresh token from the login page.
    pub async fn token(&mut self) -> String {
        self.get("/Identity/Account/Login").await.token()
    }

    /// Creates a confirmed account and signs in through the login form.
    pub async fn sign_in(&mut self, state: &AppState, email: &str) {
        state
            .identity
            .create_confirmed_user(email, PASSWORD, &[])
            .await
            .expect("user should be created");

        let token = self.token().await;
        let response = self
            .post_form(
                "/Identity/Account/Login",
                &[
                    ("email", email),
                    ("password", PASSWORD),
                    ("returnUrl", "/"),
                    ("__RequestVerificationToken", &token),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie.as_str()),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("response expected");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
            && pair.starts_with(SESSION_COOKIE)
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body should be readable")
            .to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

pub fn in_memory_state() -> AppState {
    AppState::in_memory(AppConfig::in_memory())
}
