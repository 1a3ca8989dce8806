//! Migration: Create teams and user_teams tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::Plan).string().not_null().default("free"))
                    .col(ColumnDef::new(Teams::StripeId).string().null())
                    .col(ColumnDef::new(Teams::SubscriptionId).string().null())
                    .col(ColumnDef::new(Teams::StartsAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Teams::EndsAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Teams::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserTeams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserTeams::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserTeams::TeamId).uuid().not_null())
                    .col(ColumnDef::new(UserTeams::Role).string().not_null().default("MEMBER"))
                    .col(
                        ColumnDef::new(UserTeams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(Index::create().col(UserTeams::UserId).col(UserTeams::TeamId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_teams_user_id")
                            .from(UserTeams::Table, UserTeams::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_teams_team_id")
                            .from(UserTeams::Table, UserTeams::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Membership lookups are always by user
        manager
            .create_index(
                Index::create()
                    .name("idx_user_teams_user_id")
                    .table(UserTeams::Table)
                    .col(UserTeams::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTeams::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Teams {
    Table,
    Id,
    Name,
    Plan,
    StripeId,
    SubscriptionId,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserTeams {
    Table,
    UserId,
    TeamId,
    Role,
    CreatedAt,
}
