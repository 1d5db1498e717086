use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    extract::{AntiForgeryForm, CurrentSession, RequireUser},
    models::{DeleteForm, Employee, EmployeeForm},
    repository::UpdateOutcome,
    state::AppState,
    validation::{ValidationErrors, parse_id, validate_employee},
    views::{self, PageContext},
};

const INDEX_PATH: &str = "/";

async fn find_employee(state: &AppState, raw_id: &str) -> AppResult<Employee> {
    let id = parse_id(raw_id).ok_or_else(|| AppError::not_found("employee id is not valid"))?;

    state
        .employees
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))
}

pub async fn index(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Html<String>> {
    let employees = state.employees.list().await?;
    Ok(Html(views::employees::index(
        &PageContext::load(&session).await?,
        &employees,
    )))
}

/// Details, Edit and Delete reached without an id.
pub async fn missing_id() -> AppResult<()> {
    Err(AppError::not_found("employee id is missing"))
}

pub async fn details(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let employee = find_employee(&state, &raw_id).await?;
    Ok(Html(views::employees::details(
        &PageContext::load(&session).await?,
        &employee,
    )))
}

pub async fn create_form(
    RequireUser(_user): RequireUser,
    CurrentSession(session): CurrentSession,
) -> AppResult<Html<String>> {
    Ok(Html(views::employees::create_form(
        &PageContext::with_form(&session).await?,
        &EmployeeForm::default(),
        &ValidationErrors::new(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    CurrentSession(session): CurrentSession,
    AntiForgeryForm(form): AntiForgeryForm<EmployeeForm>,
) -> AppResult<Response> {
    let input = match validate_employee(&form) {
        Ok(input) => input,
        Err(errors) => {
            debug!(errors = errors.len(), "create submission failed validation");
            return Ok(Html(views::employees::create_form(
                &PageContext::with_form(&session).await?,
                &form,
                &errors,
            ))
            .into_response());
        }
    };

    let employee = state.employees.create(input).await?;
    info!(employee_id = employee.id, user_id = %user.id, "employee created");

    Ok(Redirect::to(INDEX_PATH).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    CurrentSession(session): CurrentSession,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let employee = find_employee(&state, &raw_id).await?;
    Ok(Html(views::employees::edit_form(
        &PageContext::with_form(&session).await?,
        employee.id,
        &EmployeeForm::from_employee(&employee),
        &ValidationErrors::new(),
    )))
}

pub async fn edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    CurrentSession(session): CurrentSession,
    Path(raw_id): Path<String>,
    AntiForgeryForm(form): AntiForgeryForm<EmployeeForm>,
) -> AppResult<Response> {
    let id = match (parse_id(&raw_id), parse_id(&form.id)) {
        (Some(route_id), Some(form_id)) if route_id == form_id => route_id,
        _ => {
            return Err(AppError::not_found(format!(
                "route id '{raw_id}' does not match submitted id '{}'",
                form.id
            )));
        }
    };

    let input = match validate_employee(&form) {
        Ok(input) => input,
        Err(errors) => {
            debug!(employee_id = id, errors = errors.len(), "edit submission failed validation");
            return Ok(Html(views::employees::edit_form(
                &PageContext::with_form(&session).await?,
                id,
                &form,
                &errors,
            ))
            .into_response());
        }
    };

    match state.employees.update(id, input).await? {
        UpdateOutcome::Updated(_) => {
            info!(employee_id = id, user_id = %user.id, "employee updated");
        }
        UpdateOutcome::Conflict => {
            if !state.employees.exists(id).await? {
                return Err(AppError::not_found(format!(
                    "employee {id} was deleted before the edit was saved"
                )));
            }
            return Err(AppError::conflict(format!(
                "employee {id} could not be saved"
            )));
        }
    }

    Ok(Redirect::to(INDEX_PATH).into_response())
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let employee = find_employee(&state, &raw_id).await?;
    Ok(Html(views::employees::delete_confirm(
        &PageContext::with_form(&session).await?,
        &employee,
    )))
}

/// Removes the employee if it is still there; deleting an absent record is
/// not an error.
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    AntiForgeryForm(_form): AntiForgeryForm<DeleteForm>,
) -> AppResult<Redirect> {
    if let Some(id) = parse_id(&raw_id) {
        if state.employees.delete(id).await? {
            info!(employee_id = id, "employee deleted");
        } else {
            debug!(employee_id = id, "delete of absent employee ignored");
        }
    }

    Ok(Redirect::to(INDEX_PATH))
}
