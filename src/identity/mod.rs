//! Identity subsystem
//!
//! User accounts live in their own store, separate from the employee table.
//! Registration creates an unconfirmed account; sign-in is refused until the
//! account has been confirmed through its confirmation link.

pub mod password;
pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use crate::validation::ValidationErrors;

pub use store::{InMemoryUserStore, NewUser, PgUserStore, UserRecord, UserStore};

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email '{0}' is already taken")]
    DuplicateEmail(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{0}")]
    WeakPassword(String),
    #[error("invalid login attempt")]
    InvalidCredentials,
    #[error("account is not confirmed")]
    NotConfirmed,
    #[error("invalid confirmation link")]
    InvalidConfirmation,
    #[error("password hashing failed")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("blocking task failed")]
    Blocking(#[from] tokio::task::JoinError),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The authenticated principal attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

/// An account awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub user_id: Uuid,
    pub email: String,
    pub confirmation_code: String,
}

impl PendingRegistration {
    pub fn confirmation_path(&self) -> String {
        format!(
            "/Identity/Account/ConfirmEmail?userId={}&code={}",
            self.user_id, self.confirmation_code
        )
    }
}

/// Password checked against when the email is unknown, so that sign-in costs
/// one bcrypt verification whether or not the account exists.
const UNKNOWN_ACCOUNT_PASSWORD: &str = "no-such-account-0";

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn UserStore>,
    hash_cost: u32,
    // hashed lazily at `hash_cost`
    unknown_account_hash: Arc<OnceCell<String>>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn UserStore>, hash_cost: u32) -> Self {
        Self {
            store,
            hash_cost,
            unknown_account_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn init(&self) -> IdentityResult<()> {
        self.store.init().await
    }

    /// Creates an unconfirmed account and returns the pending confirmation.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> IdentityResult<PendingRegistration> {
        let email = validate_email(email)?;
        password::validate_password(password)?;

        let confirmation_code = Uuid::new_v4().simple().to_string();
        let record = self
            .store
            .insert_user(NewUser {
                normalized_email: normalize(&email),
                email,
                password_hash: password::hash_password(password, self.hash_cost).await?,
                email_confirmed: false,
                confirmation_code: Some(confirmation_code.clone()),
            })
            .await?;

        let pending = PendingRegistration {
            user_id: record.id,
            email: record.email,
            confirmation_code,
        };

        info!(
            user_id = %pending.user_id,
            link = %pending.confirmation_path(),
            "account registered, confirmation pending"
        );

        Ok(pending)
    }

    pub async fn confirm_email(&self, user_id: Uuid, code: &str) -> IdentityResult<()> {
        if self.store.confirm_email(user_id, code).await? {
            info!(user_id = %user_id, "account confirmed");
            Ok(())
        } else {
            Err(IdentityError::InvalidConfirmation)
        }
    }

    /// Checks credentials. Accounts must be confirmed before they can sign in.
    pub async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<SignedInUser> {
        let Some(user) = self.store.find_by_email(&normalize(email)).await? else {
            let hash = self
                .unknown_account_hash
                .get_or_try_init(|| {
                    password::hash_password(UNKNOWN_ACCOUNT_PASSWORD, self.hash_cost)
                })
                .await?;
            password::verify_password(password, hash).await?;
            debug!("sign-in for unknown account");
            return Err(IdentityError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash).await? {
            debug!(user_id = %user.id, "sign-in with wrong password");
            return Err(IdentityError::InvalidCredentials);
        }

        if !user.email_confirmed {
            return Err(IdentityError::NotConfirmed);
        }

        let roles = self.store.roles_for(user.id).await?;
        info!(user_id = %user.id, "user signed in");

        Ok(SignedInUser {
            id: user.id,
            email: user.email,
            roles,
        })
    }

    /// Creates an already confirmed account, optionally in some roles.
    pub async fn create_confirmed_user(
        &self,
        email: &str,
        password: &str,
        roles: &[String],
    ) -> IdentityResult<Uuid> {
        let email = validate_email(email)?;
        password::validate_password(password)?;

        let record = self
            .store
            .insert_user(NewUser {
                normalized_email: normalize(&email),
                email,
                password_hash: password::hash_password(password, self.hash_cost).await?,
                email_confirmed: true,
                confirmation_code: None,
            })
            .await?;

        for role in roles {
            self.add_to_role(record.id, role).await?;
        }

        Ok(record.id)
    }

    pub async fn add_to_role(&self, user_id: Uuid, role: &str) -> IdentityResult<()> {
        let role = role.trim();
        self.store.add_to_role(user_id, role, &normalize(role)).await
    }
}

/// Field-level checks for the registration form.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if email.trim().is_empty() {
        errors.push("email", "The Email field is required.");
    } else if let Err(err) = validate_email(email) {
        errors.push("email", format!("{err}."));
    }

    if password.is_empty() {
        errors.push("password", "The Password field is required.");
    } else if let Err(err) = password::validate_password(password) {
        errors.push("password", err.to_string());
    }

    if password != confirm_password {
        errors.push(
            "confirmPassword",
            "The password and confirmation password do not match.",
        );
    }

    errors.into_result(())
}

fn validate_email(raw: &str) -> IdentityResult<String> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email.to_string())
    } else {
        Err(IdentityError::InvalidEmail(email.to_string()))
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}
