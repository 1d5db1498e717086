use super::{PageContext, escape, field_errors, input_field, layout};
use crate::{
    models::{LoginForm, RegisterForm},
    validation::ValidationErrors,
};

pub fn register_form(
    ctx: &PageContext,
    form: &RegisterForm,
    errors: &ValidationErrors,
) -> String {
    // passwords are never echoed back
    let body = format!(
        r#"    <h1>Register</h1>
    <h2>Create a new account.</h2>
    <form method="post" action="/Identity/Account/Register">
      {token}
{email}{password}{confirm}      <button type="submit">Register</button>
    </form>
"#,
        token = ctx.token_field(),
        email = input_field(errors, "email", "Email", "email", &form.email),
        password = input_field(errors, "password", "Password", "password", ""),
        confirm = input_field(
            errors,
            "confirmPassword",
            "Confirm password",
            "password",
            ""
        ),
    );

    layout(ctx, "Register", &body)
}

pub fn register_confirmation(
    ctx: &PageContext,
    email: &str,
    confirmation_link: Option<&str>,
) -> String {
    let link = match confirmation_link {
        Some(link) => format!(
            r#"    <p>No email sender is configured. <a id="confirm-link" href="{}">Click here to confirm your account</a>.</p>
"#,
            escape(link)
        ),
        None => "    <p>Please check your email to confirm your account.</p>\n".to_string(),
    };

    let body = format!(
        r#"    <h1>Register confirmation</h1>
    <p>An account was created for {}.</p>
{link}"#,
        escape(email)
    );

    layout(ctx, "Register confirmation", &body)
}

pub fn confirm_email_result(ctx: &PageContext, confirmed: bool) -> String {
    let message = if confirmed {
        "Thank you for confirming your email."
    } else {
        "Error confirming your email."
    };

    let body = format!("    <h1>Confirm email</h1>\n    <p>{message}</p>\n");
    layout(ctx, "Confirm email", &body)
}

pub fn login_form(ctx: &PageContext, form: &LoginForm, errors: &ValidationErrors) -> String {
    let body = format!(
        r#"    <h1>Log in</h1>
    <form method="post" action="/Identity/Account/Login">
      {token}
      <input type="hidden" name="returnUrl" value="{return_url}" />
      {summary}
{email}{password}      <button type="submit">Log in</button>
    </form>
    <p><a href="/Identity/Account/Register">Register as a new user</a></p>
"#,
        token = ctx.token_field(),
        return_url = escape(&form.return_url),
        summary = field_errors(errors, ""),
        email = input_field(errors, "email", "Email", "email", &form.email),
        password = input_field(errors, "password", "Password", "password", ""),
    );

    layout(ctx, "Log in", &body)
}
