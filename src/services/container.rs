//! Service Container - Centralized service access.
//!
//! Builds every service over one shared Unit of Work and hands them out
//! as trait objects.

use std::sync::Arc;

use super::{SessionAuthenticator, SessionService, TeamManager, TeamService};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get session service
    fn sessions(&self) -> Arc<dyn SessionService>;

    /// Get team service
    fn teams(&self) -> Arc<dyn TeamService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    session_service: Arc<dyn SessionService>,
    team_service: Arc<dyn TeamService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(session_service: Arc<dyn SessionService>, team_service: Arc<dyn TeamService>) -> Self {
        Self {
            session_service,
            team_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let session_service = Arc::new(SessionAuthenticator::new(uow.clone(), config));
        let team_service = Arc::new(TeamManager::new(uow));

        Self::new(session_service, team_service)
    }
}

impl ServiceContainer for Services {
    fn sessions(&self) -> Arc<dyn SessionService> {
        self.session_service.clone()
    }

    fn teams(&self) -> Arc<dyn TeamService> {
        self.team_service.clone()
    }
}
