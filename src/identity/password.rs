use super::{IdentityError, IdentityResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a password using bcrypt.
///
/// bcrypt is CPU bound, so the work runs on the blocking pool instead of the
/// request task.
pub async fn hash_password(password: &str, cost: u32) -> IdentityResult<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Verifies a password against a bcrypt hash. A malformed hash counts as a
/// mismatch.
pub async fn verify_password(password: &str, hash: &str) -> IdentityResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).unwrap_or(false)
    })
    .await?;
    Ok(matches)
}

/// Validates password complexity
///
/// Enforces the following rules:
/// - Minimum 8 characters
/// - At least one letter and one digit
pub fn validate_password(password: &str) -> IdentityResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword(format!(
            "Passwords must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(IdentityError::WeakPassword(
            "Passwords must have at least one letter.".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(IdentityError::WeakPassword(
            "Passwords must have at least one digit ('0'-'9').".to_string(),
        ));
    }

    Ok(())
}
