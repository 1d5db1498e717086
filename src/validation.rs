//! Explicit binding and validation of submitted employee forms.
//!
//! Binding never stops at the first problem: every field is checked and each
//! failure is recorded as a field/message pair so the form can be redisplayed
//! with all errors at once.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{EmployeeForm, EmployeeInput};

const BIRTH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages recorded against one field, in submission order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Binds and validates the three mutable employee fields.
pub fn validate_employee(form: &EmployeeForm) -> Result<EmployeeInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let first_name = required_text(&mut errors, "firstName", "First name", &form.first_name);
    let last_name = required_text(&mut errors, "lastName", "Last name", &form.last_name);

    let birth_date = if form.birth_date.trim().is_empty() {
        errors.push("birthDate", "The Birth date field is required.");
        None
    } else {
        let parsed = parse_birth_date(&form.birth_date);
        if parsed.is_none() {
            errors.push(
                "birthDate",
                format!(
                    "The value '{}' is not valid for Birth date.",
                    form.birth_date.trim()
                ),
            );
        }
        parsed
    };

    match (first_name, last_name, birth_date) {
        (Some(first_name), Some(last_name), Some(birth_date)) if errors.is_empty() => {
            Ok(EmployeeInput {
                first_name,
                last_name,
                birth_date,
            })
        }
        _ => Err(errors),
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    raw: &str,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, format!("The {label} field is required."));
        return None;
    }
    Some(value.to_string())
}

/// Accepts a plain date (midnight) or a local date-time.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    BIRTH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a route or form identifier. Anything that is not an integer is
/// treated as an absent identifier.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}
