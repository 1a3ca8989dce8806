//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{ServiceContainer, Services, SessionService, TeamService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Session resolution
    pub session_service: Arc<dyn SessionService>,
    /// Team use cases
    pub team_service: Arc<dyn TeamService>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it uses
    /// the ServiceContainer for centralized service management.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            session_service: container.sessions(),
            team_service: container.teams(),
            database,
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        session_service: Arc<dyn SessionService>,
        team_service: Arc<dyn TeamService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            session_service,
            team_service,
            database,
        }
    }
}
