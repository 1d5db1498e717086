use anyhow::{Context, Result, anyhow};
use std::env;
use std::time::Duration;

/// Which adapter backs a store, chosen from the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("connection string '{url}' has no scheme"))?;

        match scheme.as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(anyhow!(
                "unsupported connection string scheme '{other}', expected postgres:// or memory://"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_env(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(anyhow!(
                "APP_ENVIRONMENT must be one of: Development, Production"
            )),
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// A required connection string together with the adapter it selects.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    pub url: String,
    pub backend: StoreBackend,
}

impl ConnectionString {
    pub fn parse(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let backend = StoreBackend::from_url(&url)?;
        Ok(Self { url, backend })
    }

    pub fn memory() -> Self {
        Self {
            url: "memory://".to_string(),
            backend: StoreBackend::Memory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub employee_db: ConnectionString,
    pub identity_db: ConnectionString,
    pub db_max_connections: u32,
    pub session_idle_timeout: Duration,
    pub password_hash_cost: u32,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns a variable's
    /// value or `None` when it is unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| -> Result<ConnectionString> {
            let url = lookup(key).with_context(|| format!("connection string {key} not found"))?;
            ConnectionString::parse(url).with_context(|| format!("{key} is invalid"))
        };

        let host = var_or("APP_HOST", "0.0.0.0");

        let port = var_or("APP_PORT", "8080")
            .parse::<u16>()
            .context("APP_PORT must be a valid u16")?;

        let environment = Environment::from_env(&var_or("APP_ENVIRONMENT", "Production"))?;

        let employee_db = required("EMPLOYEE_DATABASE_URL")?;
        let identity_db = required("IDENTITY_DATABASE_URL")?;

        let db_max_connections = var_or("DB_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;

        let session_idle_minutes = var_or("SESSION_IDLE_MINUTES", "20")
            .parse::<u64>()
            .context("SESSION_IDLE_MINUTES must be a valid u64")?;

        let password_hash_cost = match lookup("PASSWORD_HASH_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .context("PASSWORD_HASH_COST must be a valid u32")?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&password_hash_cost) {
            return Err(anyhow!("PASSWORD_HASH_COST must be between 4 and 31"));
        }

        let static_dir = var_or("STATIC_DIR", "static");

        Ok(Self {
            host,
            port,
            environment,
            employee_db,
            identity_db,
            db_max_connections,
            session_idle_timeout: Duration::from_secs(session_idle_minutes * 60),
            password_hash_cost,
            static_dir,
        })
    }

    /// Configuration backed entirely by in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: Environment::Development,
            employee_db: ConnectionString::memory(),
            identity_db: ConnectionString::memory(),
            db_max_connections: 1,
            session_idle_timeout: Duration::from_secs(20 * 60),
            password_hash_cost: 4,
            static_dir: "static".to_string(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
