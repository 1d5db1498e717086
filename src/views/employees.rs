use chrono::NaiveDateTime;

use super::{PageContext, escape, input_field, layout};
use crate::{
    models::{Employee, EmployeeForm},
    validation::ValidationErrors,
};

fn display_date(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

pub fn index(ctx: &PageContext, employees: &[Employee]) -> String {
    let mut rows = String::new();
    for employee in employees {
        rows.push_str(&format!(
            r#"      <tr data-employee-id="{id}">
        <td>{first}</td>
        <td>{last}</td>
        <td>{birth}</td>
        <td>
          <a href="/Employee/Edit/{id}">Edit</a> |
          <a href="/Employee/Details/{id}">Details</a> |
          <a href="/Employee/Delete/{id}">Delete</a>
        </td>
      </tr>
"#,
            id = employee.id,
            first = escape(&employee.first_name),
            last = escape(&employee.last_name),
            birth = display_date(&employee.birth_date),
        ));
    }

    let body = format!(
        r#"    <h1>Employees</h1>
    <p><a href="/Employee/Create">Create New</a></p>
    <table class="employees">
      <thead>
        <tr><th>First name</th><th>Last name</th><th>Birth date</th><th></th></tr>
      </thead>
      <tbody>
{rows}      </tbody>
    </table>
"#
    );

    layout(ctx, "Employees", &body)
}

fn definition_list(employee: &Employee) -> String {
    format!(
        r#"    <dl>
      <dt>First name</dt><dd>{}</dd>
      <dt>Last name</dt><dd>{}</dd>
      <dt>Birth date</dt><dd>{}</dd>
    </dl>
"#,
        escape(&employee.first_name),
        escape(&employee.last_name),
        display_date(&employee.birth_date),
    )
}

pub fn details(ctx: &PageContext, employee: &Employee) -> String {
    let body = format!(
        r#"    <h1>Details</h1>
    <h4>Employee</h4>
{}    <p>
      <a href="/Employee/Edit/{id}">Edit</a> |
      <a href="/Employee">Back to List</a>
    </p>
"#,
        definition_list(employee),
        id = employee.id,
    );

    layout(ctx, "Details", &body)
}

fn employee_fields(form: &EmployeeForm, errors: &ValidationErrors) -> String {
    let mut fields = String::new();
    fields.push_str(&input_field(
        errors,
        "firstName",
        "First name",
        "text",
        &form.first_name,
    ));
    fields.push_str(&input_field(
        errors,
        "lastName",
        "Last name",
        "text",
        &form.last_name,
    ));
    fields.push_str(&input_field(
        errors,
        "birthDate",
        "Birth date",
        "datetime-local",
        &form.birth_date,
    ));
    fields
}

fn validation_summary(errors: &ValidationErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }
    "    <div class=\"summary-error\">Please correct the errors below.</div>\n".to_string()
}

pub fn create_form(
    ctx: &PageContext,
    form: &EmployeeForm,
    errors: &ValidationErrors,
) -> String {
    let body = format!(
        r#"    <h1>Create</h1>
    <h4>Employee</h4>
{summary}    <form method="post" action="/Employee/Create">
      {token}
{fields}      <button type="submit">Create</button>
    </form>
    <p><a href="/Employee">Back to List</a></p>
"#,
        summary = validation_summary(errors),
        token = ctx.token_field(),
        fields = employee_fields(form, errors),
    );

    layout(ctx, "Create", &body)
}

/// `id` is the route identifier; the hidden field echoes the submitted one so
/// a redisplayed form keeps what the user sent.
pub fn edit_form(
    ctx: &PageContext,
    id: i32,
    form: &EmployeeForm,
    errors: &ValidationErrors,
) -> String {
    let body = format!(
        r#"    <h1>Edit</h1>
    <h4>Employee</h4>
{summary}    <form method="post" action="/Employee/Edit/{id}">
      {token}
      <input type="hidden" name="id" value="{hidden_id}" />
{fields}      <button type="submit">Save</button>
    </form>
    <p><a href="/Employee">Back to List</a></p>
"#,
        summary = validation_summary(errors),
        token = ctx.token_field(),
        hidden_id = escape(&form.id),
        fields = employee_fields(form, errors),
    );

    layout(ctx, "Edit", &body)
}

pub fn delete_confirm(ctx: &PageContext, employee: &Employee) -> String {
    let body = format!(
        r#"    <h1>Delete</h1>
    <h3>Are you sure you want to delete this?</h3>
    <h4>Employee</h4>
{list}    <form method="post" action="/Employee/Delete/{id}">
      {token}
      <input type="hidden" name="id" value="{id}" />
      <button type="submit">Delete</button> |
      <a href="/Employee">Back to List</a>
    </form>
"#,
        list = definition_list(employee),
        id = employee.id,
        token = ctx.token_field(),
    );

    layout(ctx, "Delete", &body)
}
