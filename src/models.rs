use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Hidden form field carrying the anti-forgery token.
pub const ANTIFORGERY_FIELD: &str = "__RequestVerificationToken";

/// Format used to prefill `datetime-local` inputs.
pub const BIRTH_DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDateTime,
}

/// The mutable fields of an employee after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDateTime,
}

/// Raw create/edit submission. Every field is kept as submitted so a failed
/// validation can redisplay exactly what the user typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmployeeForm {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    #[serde(rename = "__RequestVerificationToken")]
    pub request_token: String,
}

impl EmployeeForm {
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            birth_date: employee
                .birth_date
                .format(BIRTH_DATE_INPUT_FORMAT)
                .to_string(),
            request_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub id: String,
    #[serde(rename = "__RequestVerificationToken")]
    pub request_token: String,
}

/// Form carrying nothing but the anti-forgery token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenOnlyForm {
    #[serde(rename = "__RequestVerificationToken")]
    pub request_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(rename = "__RequestVerificationToken")]
    pub request_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub return_url: String,
    #[serde(rename = "__RequestVerificationToken")]
    pub request_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "ReturnUrl", alias = "returnUrl")]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailQuery {
    pub user_id: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}
