use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityError, IdentityResult};

/// Persisted user account
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub confirmation_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub confirmation_code: Option<String>,
}

/// Storage for users, roles and role membership. Emails and role names are
/// passed already normalized.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn init(&self) -> IdentityResult<()>;
    async fn insert_user(&self, user: NewUser) -> IdentityResult<UserRecord>;
    async fn find_by_email(&self, normalized_email: &str) -> IdentityResult<Option<UserRecord>>;
    /// Confirms the account when `code` matches the pending code.
    async fn confirm_email(&self, id: Uuid, code: &str) -> IdentityResult<bool>;
    async fn add_to_role(
        &self,
        user_id: Uuid,
        role: &str,
        normalized_role: &str,
    ) -> IdentityResult<()>;
    async fn roles_for(&self, user_id: Uuid) -> IdentityResult<Vec<String>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn init(&self) -> IdentityResult<()> {
        // Both stores may share one database and its `_sqlx_migrations`
        // table, so versions applied by the other migrator are expected.
        let mut migrator = sqlx::migrate!("./migrations/identity");
        migrator.set_ignore_missing(true).run(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> IdentityResult<UserRecord> {
        let result = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, normalized_email, password_hash, email_confirmed, confirmation_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id,
                email,
                normalized_email,
                password_hash,
                email_confirmed,
                confirmation_code,
                created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(&user.password_hash)
        .bind(user.email_confirmed)
        .bind(&user.confirmation_code)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                Err(IdentityError::DuplicateEmail(user.email))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, normalized_email: &str) -> IdentityResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, normalized_email, password_hash, email_confirmed, confirmation_code, created_at
            FROM users
            WHERE normalized_email = $1
            "#,
        )
        .bind(normalized_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn confirm_email(&self, id: Uuid, code: &str) -> IdentityResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_confirmed = TRUE, confirmation_code = NULL
            WHERE id = $1 AND confirmation_code = $2
            "#,
        )
        .bind(id)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_to_role(
        &self,
        user_id: Uuid,
        role: &str,
        normalized_role: &str,
    ) -> IdentityResult<()> {
        let mut tx = self.pool.begin().await?;

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (id, name, normalized_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (normalized_name) DO UPDATE SET name = roles.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(role)
        .bind(normalized_role)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn roles_for(&self, user_id: Uuid) -> IdentityResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }
}

#[derive(Debug, Default)]
struct MemoryIdentity {
    users: HashMap<Uuid, UserRecord>,
    // normalized name -> (id, display name)
    roles: BTreeMap<String, (Uuid, String)>,
    memberships: HashSet<(Uuid, Uuid)>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<MemoryIdentity>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn init(&self) -> IdentityResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> IdentityResult<UserRecord> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .values()
            .any(|existing| existing.normalized_email == user.normalized_email)
        {
            return Err(IdentityError::DuplicateEmail(user.email));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            normalized_email: user.normalized_email,
            password_hash: user.password_hash,
            email_confirmed: user.email_confirmed,
            confirmation_code: user.confirmation_code,
            created_at: Utc::now(),
        };

        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, normalized_email: &str) -> IdentityResult<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.normalized_email == normalized_email)
            .cloned())
    }

    async fn confirm_email(&self, id: Uuid, code: &str) -> IdentityResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(false);
        };

        if user.confirmation_code.as_deref() != Some(code) {
            return Ok(false);
        }

        user.email_confirmed = true;
        user.confirmation_code = None;
        Ok(true)
    }

    async fn add_to_role(
        &self,
        user_id: Uuid,
        role: &str,
        normalized_role: &str,
    ) -> IdentityResult<()> {
        let mut inner = self.inner.write().await;
        let role_id = inner
            .roles
            .entry(normalized_role.to_string())
            .or_insert_with(|| (Uuid::new_v4(), role.to_string()))
            .0;
        inner.memberships.insert((user_id, role_id));
        Ok(())
    }

    async fn roles_for(&self, user_id: Uuid) -> IdentityResult<Vec<String>> {
        let inner = self.inner.read().await;
        let mut roles = inner
            .roles
            .values()
            .filter(|(role_id, _)| inner.memberships.contains(&(user_id, *role_id)))
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();
        roles.sort();
        Ok(roles)
    }
}
