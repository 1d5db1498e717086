mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use employee_roster::{bootstrap, build_router, config::AppConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

const DEFAULT_LOG_FILTER: &str = "employee_roster=debug,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load application configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => cli::migrate(&config).await,
        Command::Seed => cli::seed(&config).await,
        Command::CreateUser {
            email,
            password,
            roles,
        } => cli::create_user(&config, &email, &password, &roles).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.address();
    let environment = config.environment;

    let state = bootstrap::build_state(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, environment = ?environment, "employee roster started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("employee roster stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or, on unix, SIGTERM. A handler that cannot be
/// installed never fires.
async fn shutdown_signal() {
    let signal = tokio::select! {
        () = interrupt() => "interrupt",
        () = terminate() => "terminate",
    };
    info!(signal, "shutdown requested, draining connections");
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut sigterm) = signal(SignalKind::terminate()).inspect_err(|err| {
        error!(error = %err, "SIGTERM handler unavailable");
    }) else {
        return std::future::pending().await;
    };
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending().await
}
