use axum::{
    Router,
    http::{HeaderValue, header::STRICT_TRANSPORT_SECURITY},
    routing::{get, post},
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{
    handlers::{account, employees, healthcheck, list, not_found},
    session::session_layer,
    state::AppState,
};

/// 30 days.
const HSTS_VALUE: &str = "max-age=2592000";

/// Conventional `{controller}/{action}/{id?}` routes; the default controller
/// is Employee and the default action Index.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(employees::index))
        .route("/Employee", get(employees::index))
        .route("/Employee/Index", get(employees::index))
        .route("/Employee/Details", get(employees::missing_id))
        .route("/Employee/Details/{id}", get(employees::details))
        .route(
            "/Employee/Create",
            get(employees::create_form).post(employees::create),
        )
        .route("/Employee/Edit", get(employees::missing_id))
        .route(
            "/Employee/Edit/{id}",
            get(employees::edit_form).post(employees::edit),
        )
        .route("/Employee/Delete", get(employees::missing_id))
        .route(
            "/Employee/Delete/{id}",
            get(employees::delete_confirm).post(employees::delete),
        )
        .route("/List", get(list::index))
        .route("/List/Index", get(list::index))
        .route(
            "/Identity/Account/Register",
            get(account::register_form).post(account::register),
        )
        .route(
            "/Identity/Account/Login",
            get(account::login_form).post(account::login),
        )
        .route("/Identity/Account/Logout", post(account::logout))
        .route("/Identity/Account/ConfirmEmail", get(account::confirm_email))
        .route("/health", get(healthcheck))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(not_found)
        .layer(session_layer(
            state.config.session_idle_timeout,
            !state.config.environment.is_development(),
        ));

    let router = if state.config.environment.is_development() {
        router
    } else {
        router.layer(SetResponseHeaderLayer::if_not_present(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        ))
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
