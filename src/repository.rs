use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Employee, EmployeeInput},
};

/// Result of a full-replace update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Employee),
    /// No row was written: the record vanished between load and save.
    Conflict,
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn init(&self) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<Employee>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Employee>>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, input: EmployeeInput) -> AppResult<Employee>;
    async fn update(&self, id: i32, input: EmployeeInput) -> AppResult<UpdateOutcome>;
    /// Returns whether a row was removed. Absent rows are not an error.
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn init(&self) -> AppResult<()> {
        // Both stores may share one database and its `_sqlx_migrations`
        // table, so versions applied by the other migrator are expected.
        let mut migrator = sqlx::migrate!("./migrations/employees");
        migrator.set_ignore_missing(true).run(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, birth_date
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, birth_date
            FROM employees
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM employees WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, input: EmployeeInput) -> AppResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (first_name, last_name, birth_date)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, birth_date
            "#,
        )
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.birth_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn update(&self, id: i32, input: EmployeeInput) -> AppResult<UpdateOutcome> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET first_name = $1, last_name = $2, birth_date = $3
            WHERE id = $4
            RETURNING id, first_name, last_name, birth_date
            "#,
        )
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.birth_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match employee {
            Some(employee) => UpdateOutcome::Updated(employee),
            None => UpdateOutcome::Conflict,
        })
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: i32,
    rows: BTreeMap<i32, Employee>,
}

/// Employee table held in process memory; ids are assigned from 1 upwards and
/// never reused.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    table: RwLock<MemoryTable>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Employee>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Employee>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.table.read().await.rows.contains_key(&id))
    }

    async fn create(&self, input: EmployeeInput) -> AppResult<Employee> {
        let mut table = self.table.write().await;
        table.next_id += 1;

        let employee = Employee {
            id: table.next_id,
            first_name: input.first_name,
            last_name: input.last_name,
            birth_date: input.birth_date,
        };

        table.rows.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: i32, input: EmployeeInput) -> AppResult<UpdateOutcome> {
        let mut table = self.table.write().await;
        let Some(employee) = table.rows.get_mut(&id) else {
            return Ok(UpdateOutcome::Conflict);
        };

        employee.first_name = input.first_name;
        employee.last_name = input.last_name;
        employee.birth_date = input.birth_date;

        Ok(UpdateOutcome::Updated(employee.clone()))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
