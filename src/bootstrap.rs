//! Connects the two stores named by the configuration and applies their
//! migrations.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::{
    config::{AppConfig, ConnectionString, StoreBackend},
    identity::{IdentityService, InMemoryUserStore, PgUserStore, UserStore},
    repository::{EmployeeRepository, InMemoryEmployeeRepository, PgEmployeeRepository},
    state::AppState,
};

async fn connect_pool(connection: &ConnectionString, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&connection.url)
        .await
        .context("failed to connect to PostgreSQL")
}

pub async fn connect_employees(config: &AppConfig) -> Result<Arc<dyn EmployeeRepository>> {
    let repository: Arc<dyn EmployeeRepository> = match config.employee_db.backend {
        StoreBackend::Postgres => {
            info!("employee store: postgres");
            let pool = connect_pool(&config.employee_db, config.db_max_connections)
                .await
                .context("employee store is unreachable")?;
            Arc::new(PgEmployeeRepository::new(pool))
        }
        StoreBackend::Memory => {
            info!("employee store: in-memory");
            Arc::new(InMemoryEmployeeRepository::new())
        }
    };

    repository
        .init()
        .await
        .context("failed to initialize employee schema")?;

    Ok(repository)
}

pub async fn connect_identity(config: &AppConfig) -> Result<IdentityService> {
    let store: Arc<dyn UserStore> = match config.identity_db.backend {
        StoreBackend::Postgres => {
            info!("identity store: postgres");
            let pool = connect_pool(&config.identity_db, config.db_max_connections)
                .await
                .context("identity store is unreachable")?;
            Arc::new(PgUserStore::new(pool))
        }
        StoreBackend::Memory => {
            info!("identity store: in-memory");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let identity = IdentityService::new(store, config.password_hash_cost);
    identity
        .init()
        .await
        .context("failed to initialize identity schema")?;

    Ok(identity)
}

pub async fn build_state(config: AppConfig) -> Result<AppState> {
    let employees = connect_employees(&config).await?;
    let identity = connect_identity(&config).await?;
    Ok(AppState::new(config, employees, identity))
}
