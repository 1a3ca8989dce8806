//! Team service - Team listing with lazy provisioning, and team creation.
//!
//! Every user is guaranteed at least one team: the first listing of a user
//! without memberships provisions a personal team for them.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{NewTeam, TeamSummary, TeamWithMembers, User};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Team service trait for dependency injection.
#[async_trait]
pub trait TeamService: Send + Sync {
    /// Teams of the user, oldest first, provisioning a personal team if needed
    async fn list_teams(&self, user: &User) -> AppResult<Vec<TeamSummary>>;

    /// Create a team with the user as ADMIN
    async fn create_team(&self, user: &User, name: String) -> AppResult<TeamWithMembers>;
}

/// Concrete implementation of TeamService using Unit of Work.
pub struct TeamManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TeamManager<U> {
    /// Create new team service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn list_or_provision(&self, user: &User) -> AppResult<Vec<TeamSummary>> {
        let teams = self.uow.teams().list_for_user(user.id).await?;
        if !teams.is_empty() {
            return Ok(teams);
        }

        let personal = NewTeam::personal(user);
        tracing::debug!(user_id = %user.id, team_name = %personal.name, "User has no teams, provisioning");

        self.uow
            .teams()
            .provision_personal_team(personal, user.id)
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> TeamService for TeamManager<U> {
    async fn list_teams(&self, user: &User) -> AppResult<Vec<TeamSummary>> {
        self.list_or_provision(user).await.inspect_err(|e| {
            tracing::error!(user_id = %user.id, error = ?e, "Failed to list teams");
        })
    }

    async fn create_team(&self, user: &User, name: String) -> AppResult<TeamWithMembers> {
        let created = self
            .uow
            .teams()
            .create_with_admin(NewTeam::named(name), user.id)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id = %user.id, error = ?e, "Failed to create team");
            })?;

        tracing::info!(user_id = %user.id, team_id = %created.team.id, "Team created");
        Ok(created)
    }
}
