use std::sync::Arc;

use crate::{
    config::AppConfig,
    identity::{IdentityService, InMemoryUserStore},
    repository::{EmployeeRepository, InMemoryEmployeeRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub identity: IdentityService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        employees: Arc<dyn EmployeeRepository>,
        identity: IdentityService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            employees,
            identity,
        }
    }

    /// State backed by empty in-memory stores.
    pub fn in_memory(config: AppConfig) -> Self {
        let identity = IdentityService::new(
            Arc::new(InMemoryUserStore::new()),
            config.password_hash_cost,
        );
        Self::new(config, Arc::new(InMemoryEmployeeRepository::new()), identity)
    }
}
