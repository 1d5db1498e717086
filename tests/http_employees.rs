mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{TestClient, in_memory_state};
use employee_roster::{
    AppResult, AppState,
    config::AppConfig,
    identity::{IdentityService, InMemoryUserStore},
    models::{Employee, EmployeeInput},
    repository::{EmployeeRepository, InMemoryEmployeeRepository, UpdateOutcome},
};

fn input(first: &str, last: &str) -> EmployeeInput {
    EmployeeInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1815, 12, 10)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date"),
    }
}

async fn signed_in_client() -> (TestClient, AppState) {
    let state = in_memory_state();
    let mut client = TestClient::new(state.clone());
    client.sign_in(&state, "ada@example.com").await;
    (client, state)
}

#[tokio::test]
async fn created_employee_appears_in_list() {
    let (mut client, state) = signed_in_client().await;

    let form = client.get("/Employee/Create").await;
    assert_eq!(form.status, StatusCode::OK);
    let token = form.token();

    let created = client
        .post_form(
            "/Employee/Create",
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.location.as_deref(), Some("/"));

    let list = client.get("/Employee/Index").await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.body.contains("Ada"));
    assert!(list.body.contains("Lovelace"));
    assert!(list.body.contains("1815-12-10"));

    let stored = state.employees.list().await.expect("list should succeed");
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].id, 0);
    assert_eq!(stored[0].first_name, "Ada");
    assert!(list.body.contains(&format!(r#"data-employee-id="{}""#, stored[0].id)));
}

#[tokio::test]
async fn default_route_lists_employees() {
    let state = in_memory_state();
    state.employees.create(input("Grace", "Hopper")).await.unwrap();
    let mut client = TestClient::new(state);

    for uri in ["/", "/Employee", "/Employee/Index"] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Hopper"), "{uri} should list employees");
    }
}

#[tokio::test]
async fn create_requires_authentication() {
    let state = in_memory_state();
    let mut client = TestClient::new(state.clone());

    let form = client.get("/Employee/Create").await;
    assert_eq!(form.status, StatusCode::SEE_OTHER);
    assert_eq!(
        form.location.as_deref(),
        Some("/Identity/Account/Login?ReturnUrl=%2FEmployee%2FCreate")
    );

    let token = client.token().await;
    let submitted = client
        .post_form(
            "/Employee/Create",
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;
    assert_eq!(submitted.status, StatusCode::SEE_OTHER);
    assert!(state.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn submissions_without_valid_token_are_rejected() {
    let (mut client, state) = signed_in_client().await;
    let existing = state.employees.create(input("Grace", "Hopper")).await.unwrap();

    let missing = client
        .post_form(
            "/Employee/Create",
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("birthDate", "1815-12-10"),
            ],
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let forged = client
        .post_form(
            &format!("/Employee/Delete/{}", existing.id),
            &[
                ("id", &existing.id.to_string()),
                ("__RequestVerificationToken", "forged"),
            ],
        )
        .await;
    assert_eq!(forged.status, StatusCode::BAD_REQUEST);

    let stored = state.employees.list().await.unwrap();
    assert_eq!(stored, vec![existing]);
}

#[tokio::test]
async fn token_from_another_session_is_rejected() {
    let (mut client, state) = signed_in_client().await;
    let mut stranger = TestClient::new(state.clone());
    let foreign_token = stranger.token().await;

    let response = client
        .post_form(
            "/Employee/Create",
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &foreign_token),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(state.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_create_redisplays_submitted_values() {
    let (mut client, state) = signed_in_client().await;
    let token = client.get("/Employee/Create").await.token();

    let response = client
        .post_form(
            "/Employee/Create",
            &[
                ("firstName", ""),
                ("lastName", "Lovelace"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The First name field is required."));
    assert!(response.body.contains(r#"value="Lovelace""#));
    assert!(response.body.contains(r#"value="1815-12-10""#));
    assert!(state.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_or_missing_ids_are_not_found() {
    let (mut client, _state) = signed_in_client().await;

    for uri in [
        "/Employee/Details/99",
        "/Employee/Edit/99",
        "/Employee/Delete/99",
        "/Employee/Details",
        "/Employee/Edit",
        "/Employee/Delete",
        "/Employee/Details/abc",
    ] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn details_renders_record() {
    let state = in_memory_state();
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let mut client = TestClient::new(state);

    let response = client
        .get(&format!("/Employee/Details/{}", employee.id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Lovelace"));
}

#[tokio::test]
async fn edit_with_mismatched_id_is_not_found() {
    let (mut client, state) = signed_in_client().await;
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let token = client
        .get(&format!("/Employee/Edit/{}", employee.id))
        .await
        .token();

    let response = client
        .post_form(
            &format!("/Employee/Edit/{}", employee.id),
            &[
                ("id", &(employee.id + 1).to_string()),
                ("firstName", "Changed"),
                ("lastName", "Changed"),
                ("birthDate", "1900-01-01"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let stored = state.employees.get_by_id(employee.id).await.unwrap();
    assert_eq!(stored, Some(employee));
}

#[tokio::test]
async fn edit_replaces_fields() {
    let (mut client, state) = signed_in_client().await;
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let path = format!("/Employee/Edit/{}", employee.id);

    let form = client.get(&path).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains(r#"value="1815-12-10T00:00""#));
    let token = form.token();

    let response = client
        .post_form(
            &path,
            &[
                ("id", &employee.id.to_string()),
                ("firstName", "Augusta Ada"),
                ("lastName", "King"),
                ("birthDate", "1815-12-10T08:30"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let stored = state
        .employees
        .get_by_id(employee.id)
        .await
        .unwrap()
        .expect("employee should still exist");
    assert_eq!(stored.first_name, "Augusta Ada");
    assert_eq!(stored.last_name, "King");
    assert_eq!(stored.birth_date.to_string(), "1815-12-10 08:30:00");
}

#[tokio::test]
async fn invalid_edit_redisplays_and_keeps_record() {
    let (mut client, state) = signed_in_client().await;
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let path = format!("/Employee/Edit/{}", employee.id);
    let token = client.get(&path).await.token();

    let response = client
        .post_form(
            &path,
            &[
                ("id", &employee.id.to_string()),
                ("firstName", ""),
                ("lastName", "King"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The First name field is required."));
    assert!(response.body.contains(r#"value="King""#));
    assert_eq!(
        state.employees.get_by_id(employee.id).await.unwrap(),
        Some(employee)
    );
}

#[tokio::test]
async fn edit_requires_authentication() {
    let state = in_memory_state();
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let mut client = TestClient::new(state);

    let response = client
        .get(&format!("/Employee/Edit/{}", employee.id))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(
        response
            .location
            .as_deref()
            .is_some_and(|location| location.starts_with("/Identity/Account/Login"))
    );
}

#[tokio::test]
async fn edit_of_deleted_record_is_not_found() {
    let (mut client, state) = signed_in_client().await;
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let path = format!("/Employee/Edit/{}", employee.id);
    let token = client.get(&path).await.token();

    state.employees.delete(employee.id).await.unwrap();

    let response = client
        .post_form(
            &path,
            &[
                ("id", &employee.id.to_string()),
                ("firstName", "Ada"),
                ("lastName", "King"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

/// Reports every update as a conflict while the row keeps existing.
struct AlwaysConflicting {
    inner: InMemoryEmployeeRepository,
}

#[async_trait]
impl EmployeeRepository for AlwaysConflicting {
    async fn init(&self) -> AppResult<()> {
        self.inner.init().await
    }

    async fn list(&self) -> AppResult<Vec<Employee>> {
        self.inner.list().await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Employee>> {
        self.inner.get_by_id(id).await
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        self.inner.exists(id).await
    }

    async fn create(&self, input: EmployeeInput) -> AppResult<Employee> {
        self.inner.create(input).await
    }

    async fn update(&self, _id: i32, _input: EmployeeInput) -> AppResult<UpdateOutcome> {
        Ok(UpdateOutcome::Conflict)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn unresolvable_conflict_is_a_server_error() {
    let config = AppConfig::in_memory();
    let identity = IdentityService::new(
        Arc::new(InMemoryUserStore::new()),
        config.password_hash_cost,
    );
    let repository = Arc::new(AlwaysConflicting {
        inner: InMemoryEmployeeRepository::new(),
    });
    let state = AppState::new(config, repository, identity);
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();

    let mut client = TestClient::new(state.clone());
    client.sign_in(&state, "ada@example.com").await;
    let path = format!("/Employee/Edit/{}", employee.id);
    let token = client.get(&path).await.token();

    let response = client
        .post_form(
            &path,
            &[
                ("id", &employee.id.to_string()),
                ("firstName", "Ada"),
                ("lastName", "King"),
                ("birthDate", "1815-12-10"),
                ("__RequestVerificationToken", &token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.body.contains("could not be saved"));
}

#[tokio::test]
async fn delete_is_two_step_and_idempotent() {
    let state = in_memory_state();
    let employee = state.employees.create(input("Ada", "Lovelace")).await.unwrap();
    let mut client = TestClient::new(state.clone());
    let path = format!("/Employee/Delete/{}", employee.id);

    let confirm = client.get(&path).await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert!(confirm.body.contains("Are you sure you want to delete this?"));
    let token = confirm.token();

    let fields = [
        ("id", employee.id.to_string()),
        ("__RequestVerificationToken", token),
    ];
    let fields = fields
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect::<Vec<_>>();

    let first = client.post_form(&path, &fields).await;
    assert_eq!(first.status, StatusCode::SEE_OTHER);
    assert_eq!(first.location.as_deref(), Some("/"));
    assert!(!state.employees.exists(employee.id).await.unwrap());

    let again = client.post_form(&path, &fields).await;
    assert_eq!(again.status, StatusCode::SEE_OTHER);

    let gone = client.get(&path).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
