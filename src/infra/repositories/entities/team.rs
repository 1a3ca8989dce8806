//! Team database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Team, TeamSummary};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub stripe_id: Option<String>,
    pub subscription_id: Option<String>,
    pub starts_at: Option<DateTimeUtc>,
    pub ends_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_team::Entity")]
    UserTeam,
    #[sea_orm(has_many = "super::document::Entity")]
    Document,
    #[sea_orm(has_many = "super::custom_domain::Entity")]
    CustomDomain,
}

impl Related<super::user_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTeam.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl Related<super::custom_domain::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomDomain.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Team {
    fn from(model: Model) -> Self {
        Team {
            id: model.id,
            name: model.name,
            plan: model.plan,
            stripe_id: model.stripe_id,
            subscription_id: model.subscription_id,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Model> for TeamSummary {
    fn from(model: Model) -> Self {
        TeamSummary {
            id: model.id,
            name: model.name,
        }
    }
}
