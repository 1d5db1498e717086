//! Employee roster web application.
//!
//! Server-rendered CRUD over an employee table, a static qualification list,
//! and an identity store whose signed-in users may create and edit employees.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod qualifications;
pub mod repository;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;

pub use app::build_router;
pub use error::{AppError, AppResult};
pub use state::AppState;
