//! Migration: Create documents and domains tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_teams_tables::Teams;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Documents::Name).string().not_null())
                    .col(ColumnDef::new(Documents::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Documents::TeamId).uuid().null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_owner_id")
                            .from(Documents::Table, Documents::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_team_id")
                            .from(Documents::Table, Documents::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_owner_id")
                    .table(Documents::Table)
                    .col(Documents::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Domains::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Domains::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Domains::UserId).uuid().not_null())
                    .col(ColumnDef::new(Domains::TeamId).uuid().null())
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_domains_user_id")
                            .from(Domains::Table, Domains::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_domains_team_id")
                            .from(Domains::Table, Domains::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_user_id")
                    .table(Domains::Table)
                    .col(Domains::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    Name,
    OwnerId,
    TeamId,
    CreatedAt,
}

#[derive(Iden)]
enum Domains {
    Table,
    Id,
    Slug,
    UserId,
    TeamId,
    CreatedAt,
}
