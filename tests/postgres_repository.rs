use chrono::NaiveDate;
use employee_roster::{
    identity::{IdentityError, NewUser, PgUserStore, UserStore},
    models::EmployeeInput,
    repository::{EmployeeRepository, PgEmployeeRepository, UpdateOutcome},
};
use sqlx::{PgPool, postgres::PgPoolOptions};

async fn maybe_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .ok()
}

fn input(first: &str, last: &str) -> EmployeeInput {
    EmployeeInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1815, 12, 10)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date"),
    }
}

#[tokio::test]
async fn postgres_employee_crud_flow() {
    let Some(pool) = maybe_pool().await else {
        eprintln!("Skipping postgres_employee_crud_flow: TEST_DATABASE_URL is not set or unreachable.");
        return;
    };

    let repo = PgEmployeeRepository::new(pool.clone());
    repo.init().await.expect("migrations should run");

    sqlx::query("TRUNCATE TABLE employees RESTART IDENTITY")
        .execute(repo.pool())
        .await
        .expect("truncate should succeed");

    let created = repo
        .create(input("Ada", "Lovelace"))
        .await
        .expect("create should succeed");
    assert!(created.id > 0);

    let listed = repo.list().await.expect("list should succeed");
    assert_eq!(listed, vec![created.clone()]);

    let outcome = repo
        .update(created.id, input("Augusta Ada", "King"))
        .await
        .expect("update should succeed");
    assert!(matches!(outcome, UpdateOutcome::Updated(ref e) if e.last_name == "King"));

    assert!(repo.delete(created.id).await.expect("delete should succeed"));
    assert!(!repo.delete(created.id).await.expect("delete should succeed"));
    assert!(!repo.exists(created.id).await.expect("exists should succeed"));

    let outcome = repo
        .update(created.id, input("Ada", "Lovelace"))
        .await
        .expect("update should succeed");
    assert_eq!(outcome, UpdateOutcome::Conflict);
}

#[tokio::test]
async fn postgres_user_store_flow() {
    let Some(pool) = maybe_pool().await else {
        eprintln!("Skipping postgres_user_store_flow: TEST_DATABASE_URL is not set or unreachable.");
        return;
    };

    let store = PgUserStore::new(pool.clone());
    store.init().await.expect("migrations should run");

    sqlx::query("TRUNCATE TABLE user_roles, roles, users")
        .execute(&pool)
        .await
        .expect("truncate should succeed");

    let new_user = || NewUser {
        email: "ada@example.com".to_string(),
        normalized_email: "ADA@EXAMPLE.COM".to_string(),
        password_hash: "hash".to_string(),
        email_confirmed: false,
        confirmation_code: Some("code".to_string()),
    };

    let user = store.insert_user(new_user()).await.expect("insert should succeed");
    assert!(matches!(
        store.insert_user(new_user()).await,
        Err(IdentityError::DuplicateEmail(_))
    ));

    assert!(store.confirm_email(user.id, "code").await.unwrap());
    let found = store
        .find_by_email("ADA@EXAMPLE.COM")
        .await
        .unwrap()
        .expect("user should exist");
    assert!(found.email_confirmed);

    store.add_to_role(user.id, "Admin", "ADMIN").await.unwrap();
    store.add_to_role(user.id, "Admin", "ADMIN").await.unwrap();
    assert_eq!(store.roles_for(user.id).await.unwrap(), vec!["Admin"]);
}

#[tokio::test]
async fn both_schemas_migrate_into_one_database() {
    let Some(pool) = maybe_pool().await else {
        eprintln!("Skipping both_schemas_migrate_into_one_database: TEST_DATABASE_URL is not set or unreachable.");
        return;
    };

    let employees = PgEmployeeRepository::new(pool.clone());
    let users = PgUserStore::new(pool.clone());

    for _ in 0..2 {
        employees.init().await.expect("employee migrations should run");
        users.init().await.expect("identity migrations should run");
    }

    let versions = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version",
    )
    .fetch_all(&pool)
    .await
    .expect("migration ledger should be readable");
    assert!(versions.contains(&20240101000000));
    assert!(versions.contains(&20240101000001));
}
