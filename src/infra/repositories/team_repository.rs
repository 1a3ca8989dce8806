//! Team repository implementation.
//!
//! Multi-step writes run inside a single database transaction, so a team is
//! never visible without its ADMIN membership and a provisioned team is
//! never visible without the owner's documents and domains attached.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{custom_domain, document, team, user_team};
use crate::domain::{Membership, NewTeam, Team, TeamRole, TeamSummary, TeamWithMembers};
use crate::errors::AppResult;
use crate::config::PROVISION_MAX_RETRIES;
use crate::infra::unit_of_work::{in_transaction, retry_on_serialization_failure, TransactionContext};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Team repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Teams the user belongs to, oldest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamSummary>>;

    /// Create a team with `admin_id` as its ADMIN member
    async fn create_with_admin(&self, team: NewTeam, admin_id: Uuid) -> AppResult<TeamWithMembers>;

    /// Create the owner's first team and move their documents and domains into it.
    ///
    /// Returns the owner's teams afterwards. When another request provisioned
    /// a team first, those teams are returned and nothing is created.
    async fn provision_personal_team(
        &self,
        team: NewTeam,
        owner_id: Uuid,
    ) -> AppResult<Vec<TeamSummary>>;
}

/// Concrete implementation of TeamRepository
pub struct TeamStore {
    db: DatabaseConnection,
}

impl TeamStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TeamRepository for TeamStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TeamSummary>> {
        teams_for_user(&self.db, user_id).await
    }

    async fn create_with_admin(&self, team: NewTeam, admin_id: Uuid) -> AppResult<TeamWithMembers> {
        in_transaction(&self.db, IsolationLevel::ReadCommitted, move |ctx| {
            Box::pin(create_in_tx(ctx, team, admin_id))
        })
        .await
    }

    async fn provision_personal_team(
        &self,
        team: NewTeam,
        owner_id: Uuid,
    ) -> AppResult<Vec<TeamSummary>> {
        // Overlapping first listings both pass the re-check; the loser's
        // commit fails with a serialization conflict and its retry finds
        // the winner's team
        let db = &self.db;
        retry_on_serialization_failure(PROVISION_MAX_RETRIES, move || {
            let team = team.clone();
            in_transaction(db, IsolationLevel::Serializable, move |ctx| {
                Box::pin(provision_in_tx(ctx, team, owner_id))
            })
        })
        .await
    }
}

async fn create_in_tx(
    ctx: TransactionContext<'_>,
    team: NewTeam,
    admin_id: Uuid,
) -> AppResult<TeamWithMembers> {
    let repo = ctx.teams();
    let team = repo.insert(team).await?;
    repo.add_member(team.id, admin_id, TeamRole::Admin).await?;
    let users = repo.members(team.id).await?;

    Ok(TeamWithMembers { team, users })
}

async fn provision_in_tx(
    ctx: TransactionContext<'_>,
    team: NewTeam,
    owner_id: Uuid,
) -> AppResult<Vec<TeamSummary>> {
    let repo = ctx.teams();

    // Re-checked under serializable isolation: a concurrent first listing
    // may have provisioned already
    let existing = repo.list_for_user(owner_id).await?;
    if !existing.is_empty() {
        tracing::info!(user_id = %owner_id, "Personal team already provisioned");
        return Ok(existing);
    }

    let team = repo.insert(team).await?;
    repo.add_member(team.id, owner_id, TeamRole::Admin).await?;
    let documents = repo.attach_documents(owner_id, team.id).await?;
    let domains = repo.attach_domains(owner_id, team.id).await?;

    tracing::info!(
        user_id = %owner_id,
        team_id = %team.id,
        documents,
        domains,
        "Provisioned personal team"
    );

    Ok(vec![TeamSummary::from(&team)])
}

// Query helpers shared by the pooled store and the transaction-scoped repository.

pub(crate) async fn teams_for_user<C>(db: &C, user_id: Uuid) -> AppResult<Vec<TeamSummary>>
where
    C: ConnectionTrait,
{
    let models = team::Entity::find()
        .inner_join(user_team::Entity)
        .filter(user_team::Column::UserId.eq(user_id))
        .order_by_asc(team::Column::CreatedAt)
        .order_by_asc(team::Column::Id)
        .all(db)
        .await?;

    Ok(models.into_iter().map(TeamSummary::from).collect())
}

pub(crate) async fn insert_team<C>(db: &C, new_team: NewTeam) -> AppResult<Team>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let active_model = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new_team.name),
        plan: Set(new_team.plan),
        stripe_id: Set(new_team.stripe_id),
        subscription_id: Set(new_team.subscription_id),
        starts_at: Set(new_team.starts_at),
        ends_at: Set(new_team.ends_at),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(db).await?;
    Ok(Team::from(model))
}

pub(crate) async fn insert_member<C>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
) -> AppResult<Membership>
where
    C: ConnectionTrait,
{
    let active_model = user_team::ActiveModel {
        user_id: Set(user_id),
        team_id: Set(team_id),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
    };

    let model = active_model.insert(db).await?;
    Ok(Membership::from(model))
}

pub(crate) async fn members_of<C>(db: &C, team_id: Uuid) -> AppResult<Vec<Membership>>
where
    C: ConnectionTrait,
{
    let models = user_team::Entity::find()
        .filter(user_team::Column::TeamId.eq(team_id))
        .order_by_asc(user_team::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Membership::from).collect())
}

/// Point every document owned by `owner_id` at `team_id`.
pub(crate) async fn move_documents<C>(db: &C, owner_id: Uuid, team_id: Uuid) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = document::Entity::update_many()
        .col_expr(document::Column::TeamId, Expr::value(team_id))
        .filter(document::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Point every domain registered by `user_id` at `team_id`.
pub(crate) async fn move_domains<C>(db: &C, user_id: Uuid, team_id: Uuid) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = custom_domain::Entity::update_many()
        .col_expr(custom_domain::Column::TeamId, Expr::value(team_id))
        .filter(custom_domain::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
