use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use employee_roster::{
    bootstrap,
    config::{AppConfig, StoreBackend},
    models::EmployeeInput,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "employee_roster", version, about = "Employee roster web application")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply employee and identity migrations, then exit
    Migrate,
    /// Insert a few sample employees
    Seed,
    /// Create a confirmed user account
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Role to grant; may be repeated
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

pub async fn migrate(config: &AppConfig) -> Result<()> {
    bootstrap::connect_employees(config).await?;
    bootstrap::connect_identity(config).await?;
    info!("migrations applied successfully");
    Ok(())
}

pub async fn seed(config: &AppConfig) -> Result<()> {
    if config.employee_db.backend == StoreBackend::Memory {
        warn!("seeding an in-memory employee store; the rows vanish when this command exits");
    }

    let repo = bootstrap::connect_employees(config).await?;

    let samples = [
        ("Ada", "Lovelace", (1815, 12, 10)),
        ("Grace", "Hopper", (1906, 12, 9)),
        ("Alan", "Turing", (1912, 6, 23)),
    ];

    for (first_name, last_name, (year, month, day)) in samples {
        let birth_date = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .context("invalid seed birth date")?;

        let employee = repo
            .create(EmployeeInput {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                birth_date,
            })
            .await
            .context("failed to insert seed employee")?;
        info!(employee_id = employee.id, "seeded employee");
    }

    info!("seed data inserted successfully");
    Ok(())
}

pub async fn create_user(
    config: &AppConfig,
    email: &str,
    password: &str,
    roles: &[String],
) -> Result<()> {
    if config.identity_db.backend == StoreBackend::Memory {
        warn!("creating a user in an in-memory identity store; it vanishes when this command exits");
    }

    let identity = bootstrap::connect_identity(config).await?;
    let user_id = identity
        .create_confirmed_user(email, password, roles)
        .await
        .with_context(|| format!("failed to create user {email}"))?;

    info!(user_id = %user_id, roles = ?roles, "user created");
    Ok(())
}
