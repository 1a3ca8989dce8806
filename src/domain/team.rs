//! Team domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::User;
use crate::config::{
    DEFAULT_TEAM_PLAN, PERSONAL_TEAM_NAME, PERSONAL_TEAM_SUFFIX, ROLE_ADMIN, ROLE_MANAGER,
    ROLE_MEMBER, TRIAL_TEAM_PLAN,
};

/// Membership roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    Admin,
    Manager,
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Admin => ROLE_ADMIN,
            TeamRole::Manager => ROLE_MANAGER,
            TeamRole::Member => ROLE_MEMBER,
        }
    }
}

impl From<&str> for TeamRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => TeamRole::Admin,
            ROLE_MANAGER => TeamRole::Manager,
            _ => TeamRole::Member,
        }
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub stripe_id: Option<String>,
    pub subscription_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Link between a user and a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub role: TeamRole,
}

/// A team together with its memberships
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamWithMembers {
    pub team: Team,
    pub users: Vec<Membership>,
}

/// Team as listed for a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Unique team identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Team display name
    #[schema(example = "Ada's Team")]
    pub name: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
        }
    }
}

/// Values for a team about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    pub plan: String,
    pub stripe_id: Option<String>,
    pub subscription_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl NewTeam {
    /// A team created explicitly by name, on the default plan.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plan: DEFAULT_TEAM_PLAN.to_string(),
            stripe_id: None,
            subscription_id: None,
            starts_at: None,
            ends_at: None,
        }
    }

    /// The team provisioned for a user who has none yet.
    ///
    /// It is named after the user and inherits the user's billing state.
    pub fn personal(user: &User) -> Self {
        let name = match user.display_name() {
            Some(name) => format!("{}{}", name, PERSONAL_TEAM_SUFFIX),
            None => PERSONAL_TEAM_NAME.to_string(),
        };
        let plan = user
            .plan
            .as_deref()
            .filter(|plan| !plan.is_empty())
            .unwrap_or(TRIAL_TEAM_PLAN)
            .to_string();

        Self {
            name,
            plan,
            stripe_id: user.stripe_id.clone(),
            subscription_id: user.subscription_id.clone(),
            starts_at: user.starts_at,
            ends_at: user.ends_at,
        }
    }
}

/// Created team response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    /// Unique team identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Team display name
    #[schema(example = "Acme")]
    pub name: String,
    /// Billing plan
    #[schema(example = "free")]
    pub plan: String,
    pub stripe_id: Option<String>,
    pub subscription_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Team memberships
    pub users: Vec<Membership>,
}

impl From<TeamWithMembers> for TeamResponse {
    fn from(value: TeamWithMembers) -> Self {
        let TeamWithMembers { team, users } = value;
        Self {
            id: team.id,
            name: team.name,
            plan: team.plan,
            stripe_id: team.stripe_id,
            subscription_id: team.subscription_id,
            starts_at: team.starts_at,
            ends_at: team.ends_at,
            created_at: team.created_at,
            updated_at: team.updated_at,
            users,
        }
    }
}
